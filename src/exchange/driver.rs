//! One request/response exchange.
//!
//! The driver issues a single call, re-runs the normalization pipeline over
//! the whole accumulated buffer after every read, and hands each new best
//! answer to a [`RevealScheduler`] running alongside it in the same task.
//! At stream end one authoritative pass decides the final text, which is
//! flushed before [`Exchange::run`] resolves.

use crate::core::RawBuffer;
use crate::error::ExchangeError;
use crate::exchange::request::ChatRequest;
use crate::exchange::transport::{ByteStream, ResponseBody, Transport};
use crate::normalize::{Normalizer, Phase};
use crate::reveal::{RevealOutcome, RevealPacing, RevealScheduler};
use futures_util::StreamExt;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

/// Drives exchanges over a transport.
///
/// Holds no per-exchange state: every [`Exchange::run`] call starts from an
/// empty buffer and a fresh scheduler, so a retry never sees leftovers.
#[derive(Debug)]
pub struct Exchange<T: Transport> {
    transport: T,
    normalizer: Normalizer,
    pacing: RevealPacing,
    cancel: Option<CancellationToken>,
}

impl<T: Transport> Exchange<T> {
    /// Creates a driver with the default normalizer and pacing.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            normalizer: Normalizer::default(),
            pacing: RevealPacing::default(),
            cancel: None,
        }
    }

    /// Replaces the normalizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Sets reveal pacing.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: RevealPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Attaches a cancellation token checked while waiting on the transport.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Runs one exchange, calling `on_update` with the revealed text.
    ///
    /// Updates grow monotonically until the last one, which carries the
    /// authoritative answer and may replace the text outright. The returned
    /// string equals that last update.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`ExchangeError`], or
    /// [`ExchangeError::Cancelled`] if the token fires first. No final
    /// update is delivered on error.
    pub async fn run<F>(&self, request: &ChatRequest, on_update: &mut F) -> Result<String, ExchangeError>
    where
        F: FnMut(&str) + ?Sized,
    {
        tracing::debug!(transport = self.transport.name(), "starting exchange");

        let body = self.cancellable(self.transport.send(request)).await??;

        match body {
            ResponseBody::Complete(text) => {
                let answer = self.normalizer.finalize(&text);
                on_update(&answer);
                tracing::debug!(body_len = text.len(), answer_len = answer.len(), "exchange complete");
                Ok(answer)
            }
            ResponseBody::Stream(stream) => {
                let (target_tx, target_rx) = watch::channel(String::new());
                let (drain_tx, drain_rx) = oneshot::channel();
                let scheduler = RevealScheduler::new(self.pacing);

                let (result, outcome) = tokio::join!(
                    self.read_stream(stream, target_tx, drain_tx),
                    scheduler.run(target_rx, drain_rx, on_update),
                );
                tracing::debug!(?outcome, ok = result.is_ok(), "exchange stream finished");
                debug_assert!(result.is_err() || outcome == RevealOutcome::Flushed);
                result
            }
        }
    }

    /// Reads the stream to its end, publishing each new best answer.
    ///
    /// On success the final text goes through `drain`; on error `drain` is
    /// dropped, which stops the scheduler without a flush.
    async fn read_stream(
        &self,
        mut stream: ByteStream,
        targets: watch::Sender<String>,
        drain: oneshot::Sender<String>,
    ) -> Result<String, ExchangeError> {
        let mut buffer = RawBuffer::new();

        while let Some(chunk) = self.cancellable(stream.next()).await? {
            let chunk = chunk?;
            buffer.push_bytes(&chunk);

            let best = self.normalizer.best_answer(buffer.as_str(), Phase::Incremental);
            if best.is_empty() {
                continue;
            }
            targets.send_if_modified(|current| {
                if *current == best {
                    false
                } else {
                    current.clone_from(&best);
                    true
                }
            });
        }

        if buffer.has_pending() {
            tracing::debug!("stream ended inside a multi-byte character");
        }
        buffer.finish();
        tracing::debug!(
            chunks = buffer.chunk_count(),
            bytes = buffer.len(),
            "response stream ended"
        );
        let answer = self.normalizer.finalize(buffer.as_str());
        if drain.send(answer.clone()).is_err() {
            tracing::debug!("reveal task gone before final flush");
        }
        Ok(answer)
    }

    /// Races a future against the cancellation token, if any.
    async fn cancellable<Fut: Future>(&self, fut: Fut) -> Result<Fut::Output, ExchangeError> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::debug!("exchange cancelled");
                    Err(ExchangeError::Cancelled)
                }
                output = fut => Ok(output),
            },
            None => Ok(fut.await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FALLBACK_ANSWER;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted chunks, each after a delay.
    struct ScriptedTransport {
        script: Mutex<Option<Script>>,
    }

    enum Script {
        Chunks(Vec<(u64, Result<&'static [u8], ExchangeError>)>),
        Complete(&'static str),
        Fail(ExchangeError),
        Hang,
    }

    impl ScriptedTransport {
        fn new(script: Script) -> Self {
            Self {
                script: Mutex::new(Some(script)),
            }
        }

        fn chunks(chunks: &[(u64, &'static str)]) -> Self {
            Self::new(Script::Chunks(
                chunks
                    .iter()
                    .map(|&(delay, text)| (delay, Ok(text.as_bytes())))
                    .collect(),
            ))
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, _request: &ChatRequest) -> Result<ResponseBody, ExchangeError> {
            let script = self.script.lock().unwrap().take().expect("single use");
            match script {
                Script::Complete(body) => Ok(ResponseBody::Complete(body.to_string())),
                Script::Fail(err) => Err(err),
                Script::Hang => std::future::pending().await,
                Script::Chunks(chunks) => {
                    let stream = futures_util::stream::iter(chunks).then(|(delay, item)| async move {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        item.map(Bytes::from_static)
                    });
                    Ok(ResponseBody::Stream(Box::pin(stream)))
                }
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn request() -> ChatRequest {
        ChatRequest::new("What is the VAT rate?", "test-session")
    }

    fn fast() -> RevealPacing {
        RevealPacing::default().tick(Duration::from_millis(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_resolves_with_final_answer() {
        let exchange = Exchange::new(ScriptedTransport::chunks(&[
            (0, r#"{"type":"begin"}"#),
            (50, r#"{"output":"The VAT rate "#),
            (50, r#"in Nigeria is 7.5%."}"#),
        ]))
        .with_pacing(fast());

        let mut updates: Vec<String> = Vec::new();
        let answer = exchange
            .run(&request(), &mut |text: &str| updates.push(text.to_string()))
            .await
            .unwrap();

        assert_eq!(answer, "The VAT rate in Nigeria is 7.5%.");
        assert_eq!(updates.last(), Some(&answer));
        assert!(updates.iter().all(|u| !u.contains("output")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_grow_until_final_flush() {
        let exchange = Exchange::new(ScriptedTransport::chunks(&[
            (0, "{\"output\":\"Companies income tax is 30%\"}\n"),
            (100, "{\"output\":\"Companies income tax is 30% for large companies, 20% for medium ones.\"}\n"),
            (100, ""),
        ]))
        .with_pacing(RevealPacing::default().tick(Duration::from_millis(10)).base_step(3));

        let mut updates: Vec<String> = Vec::new();
        let answer = exchange
            .run(&request(), &mut |text: &str| updates.push(text.to_string()))
            .await
            .unwrap();

        assert_eq!(
            answer,
            "Companies income tax is 30% for large companies, 20% for medium ones."
        );
        assert!(updates.len() > 3);
        let paced = &updates[..updates.len() - 1];
        for pair in paced.windows(2) {
            assert!(pair[1].chars().count() >= pair[0].chars().count());
        }
        for update in paced {
            assert!(answer.starts_with(update.as_str()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_split_utf8_sequence() {
        let naira = "₦".as_bytes();
        let first: &'static [u8] = Box::leak(
            [br#"{"output":"Threshold is "#.as_slice(), &naira[..1]]
                .concat()
                .into_boxed_slice(),
        );
        let second: &'static [u8] = Box::leak(
            [&naira[1..], br#"25 million."}"#.as_slice()]
                .concat()
                .into_boxed_slice(),
        );
        let exchange = Exchange::new(ScriptedTransport::new(Script::Chunks(vec![
            (0, Ok(first)),
            (10, Ok(second)),
        ])))
        .with_pacing(fast());

        let answer = exchange.run(&request(), &mut |_: &str| {}).await.unwrap();
        assert_eq!(answer, "Threshold is ₦25 million.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_text_stream() {
        let exchange = Exchange::new(ScriptedTransport::chunks(&[
            (0, "Thought: check the rules\n"),
            (20, "Withholding tax on dividends is 10%."),
        ]))
        .with_pacing(fast());

        let answer = exchange.run(&request(), &mut |_: &str| {}).await.unwrap();
        assert_eq!(answer, "Withholding tax on dividends is 10%.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_stream_falls_back() {
        let exchange = Exchange::new(ScriptedTransport::chunks(&[(0, r#"{"type":"begin"}"#)]))
            .with_pacing(fast());

        let mut updates: Vec<String> = Vec::new();
        let answer = exchange
            .run(&request(), &mut |text: &str| updates.push(text.to_string()))
            .await
            .unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);
        assert_eq!(updates, vec![FALLBACK_ANSWER.to_string()]);
    }

    #[tokio::test]
    async fn test_complete_body_flushes_once() {
        let exchange = Exchange::new(ScriptedTransport::new(Script::Complete(
            r#"{"reply":"Hello there"}"#,
        )));

        let mut updates: Vec<String> = Vec::new();
        let answer = exchange
            .run(&request(), &mut |text: &str| updates.push(text.to_string()))
            .await
            .unwrap();
        assert_eq!(answer, "Hello there");
        assert_eq!(updates, vec!["Hello there".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let exchange = Exchange::new(ScriptedTransport::new(Script::Fail(
            ExchangeError::HttpStatus {
                status: 503,
                body: String::new(),
            },
        )));

        let mut called = false;
        let err = exchange
            .run(&request(), &mut |_: &str| called = true)
            .await
            .unwrap_err();
        assert!(err.user_message().contains("temporarily unavailable"));
        assert!(!called);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_read_error_skips_final_flush() {
        let exchange = Exchange::new(ScriptedTransport::new(Script::Chunks(vec![
            (0, Ok(br#"{"output":"Partial answer that never finishes"}"#.as_slice())),
            (
                50,
                Err(ExchangeError::StreamRead {
                    reason: "reset".to_string(),
                }),
            ),
        ])))
        .with_pacing(RevealPacing::default().tick(Duration::from_millis(10)).base_step(1));

        let mut updates: Vec<String> = Vec::new();
        let err = exchange
            .run(&request(), &mut |text: &str| updates.push(text.to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::StreamRead { .. }));
        assert!(
            updates
                .iter()
                .all(|u| "Partial answer that never finishes".starts_with(u.as_str()))
        );
        assert_ne!(
            updates.last().map(String::as_str),
            Some("Partial answer that never finishes")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_exchange() {
        let token = CancellationToken::new();
        let exchange = Exchange::new(ScriptedTransport::new(Script::Hang))
            .with_cancellation(token.clone());

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        };
        let request = request();
        let mut on_update = |_: &str| {};
        let ((), result) = tokio::join!(canceller, exchange.run(&request, &mut on_update));
        assert_eq!(result.unwrap_err(), ExchangeError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_mid_stream() {
        let token = CancellationToken::new();
        let exchange = Exchange::new(ScriptedTransport::chunks(&[
            (0, r#"{"output":"First part."}"#),
            (10_000, r#"{"output":"Never arrives."}"#),
        ]))
        .with_pacing(fast())
        .with_cancellation(token.clone());

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            token.cancel();
        };
        let request = request();
        let mut updates: Vec<String> = Vec::new();
        let mut on_update = |text: &str| updates.push(text.to_string());
        let ((), result) = tokio::join!(canceller, exchange.run(&request, &mut on_update));

        assert_eq!(result.unwrap_err(), ExchangeError::Cancelled);
        assert_eq!(updates.last().map(String::as_str), Some("First part."));
    }
}
