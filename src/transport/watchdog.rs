//! Response timeout watchdog.
//!
//! The relay protocol has no timeout of its own. The watchdog sits outside
//! it and, when a relay stays silent too long, completes the exchange with a
//! synthetic failure response.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::TransportResult;

use super::channel::ChannelId;
use super::driver::Transport;
use super::embedder::RelayEmbedder;

/// A transport shared between its owner and watchdog tasks.
pub type SharedTransport<E> = Arc<Mutex<Transport<E>>>;

/// Spawn a task that expires channel `id` after `timeout` unless the relay
/// has answered by then.
pub fn spawn_response_timeout<E>(
    transport: SharedTransport<E>,
    id: ChannelId,
    timeout: Duration,
) -> JoinHandle<()>
where
    E: RelayEmbedder + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;

        let mut transport = match transport.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match transport.expire(id) {
            Ok(true) => warn!(
                channel_id = %id,
                timeout_ms = timeout.as_millis() as u64,
                "Relay did not respond in time"
            ),
            Ok(false) => debug!(channel_id = %id, "Exchange completed before timeout"),
            Err(e) if e.is_channel_not_found() => {
                debug!(channel_id = %id, "Channel closed before timeout")
            }
            Err(e) => warn!(channel_id = %id, error = %e, "Failed to expire exchange"),
        }
    })
}

/// Send channel `id`'s request and, if the transport has a response
/// timeout, arm a watchdog for it.
///
/// Returns the watchdog task when one was spawned.
pub fn send_with_timeout<E>(
    transport: &SharedTransport<E>,
    id: ChannelId,
) -> TransportResult<Option<JoinHandle<()>>>
where
    E: RelayEmbedder + Send + 'static,
{
    let timeout = {
        let mut guard = match transport.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.send(id)?;
        guard.response_timeout()
    };

    Ok(timeout.map(|timeout| {
        debug!(channel_id = %id, timeout_ms = timeout.as_millis() as u64, "Arming response watchdog");
        spawn_response_timeout(Arc::clone(transport), id, timeout)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::transport::MemoryEmbedder;

    fn shared() -> SharedTransport<MemoryEmbedder> {
        Arc::new(Mutex::new(Transport::new(MemoryEmbedder::new())))
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_relay_times_out() {
        let transport = shared();
        let (id, completion) = {
            let mut t = transport.lock().unwrap();
            let id = t.initialize("https://c/relay.html", "https://s").unwrap();
            t.send(id).unwrap();
            (id, t.completion(id).unwrap())
        };

        spawn_response_timeout(Arc::clone(&transport), id, Duration::from_secs(30));

        let state = completion.await.unwrap();
        assert_eq!(state.status(), Some(0));
        assert_eq!(state.status_text(), Some("Relay timeout"));
        assert_eq!(transport.lock().unwrap().open_channels(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answered_relay_not_expired() {
        let transport = shared();
        let id = {
            let mut t = transport.lock().unwrap();
            let id = t.initialize("https://c/relay.html", "https://s").unwrap();
            t.send(id).unwrap();
            t.receive(id, "status=200&responseText=ok").unwrap();
            id
        };

        spawn_response_timeout(Arc::clone(&transport), id, Duration::from_secs(1))
            .await
            .unwrap();

        let t = transport.lock().unwrap();
        assert_eq!(t.embedder().removed(), &[id]);
        assert_eq!(t.open_channels(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_timeout_expires_exchange() {
        let settings = Settings::from_toml("[channel]\nresponse_timeout_seconds = 1\n").unwrap();
        let transport = Arc::new(Mutex::new(Transport::from_config(
            MemoryEmbedder::new(),
            &settings.channel,
        )));
        let (id, mut completion) = {
            let mut t = transport.lock().unwrap();
            let id = t.initialize("https://c/relay.html", "https://s").unwrap();
            (id, t.completion(id).unwrap())
        };

        let watchdog = send_with_timeout(&transport, id).unwrap();
        assert!(watchdog.is_some());

        tokio::time::sleep(Duration::from_secs(60)).await;

        let state = completion.try_take().unwrap().unwrap();
        assert_eq!(state.status(), Some(0));
        assert_eq!(state.status_text(), Some("Relay timeout"));
        assert_eq!(transport.lock().unwrap().open_channels(), 0);
    }

    #[test]
    fn test_no_watchdog_without_timeout() {
        let transport = shared();
        let id = transport
            .lock()
            .unwrap()
            .initialize("https://c/relay.html", "https://s")
            .unwrap();

        assert!(send_with_timeout(&transport, id).unwrap().is_none());
        assert_eq!(
            transport.lock().unwrap().embedder().dispatched().len(),
            1
        );
    }

    #[test]
    fn test_send_with_timeout_unknown_channel() {
        let transport = shared();
        let err = send_with_timeout(&transport, ChannelId::new(4)).unwrap_err();
        assert!(err.is_channel_not_found());
    }
}
