//! Individual lamp control.

use std::fmt;

use log::{debug, info, warn};
use serde_json::{Value, json};

use crate::command::Command;
use crate::config::{DeviceAddress, DeviceInfo, LampConfig};
use crate::effects::EffectRegistry;
use crate::errors::Error;
use crate::history::{MessageHistory, MessageType};
use crate::request::TurnOnRequest;
use crate::state::{LampState, StatusReport};
use crate::transport::{Transport, UdpTransport};

type Result<T> = std::result::Result<T, Error>;

/// Receives state changes on behalf of the host integration.
///
/// Any `Fn(&str, &LampState)` closure is an observer; the first argument is
/// the lamp's name.
pub trait StateObserver: Send + Sync {
    fn state_changed(&self, name: &str, state: &LampState);
}

impl<F> StateObserver for F
where
    F: Fn(&str, &LampState) + Send + Sync,
{
    fn state_changed(&self, name: &str, state: &LampState) {
        self(name, state)
    }
}

/// What a call to [`Lamp::poll`] did.
#[derive(Debug)]
pub enum PollOutcome {
    /// The lamp answered; `changed` tells whether the mirror moved.
    Updated { changed: bool },
    /// The poll failed. `available` is the availability after counting it.
    Failed {
        error: Error,
        consecutive_failures: u32,
        available: bool,
    },
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Updated { .. })
    }
}

/// A single GyverLamp.
///
/// The lamp keeps a mirror of the device state that only [`poll`] updates,
/// and counts failed polls to decide when the device is unavailable.
/// Every operation takes `&mut self`, so one lamp never has two requests in
/// flight. Separate lamps share nothing.
///
/// # Example
///
/// ```no_run
/// use gyverlamp_rs::{Lamp, LampConfig, TurnOnRequest};
///
/// # async fn run() -> Result<(), gyverlamp_rs::Error> {
/// let mut lamp = Lamp::connect(&LampConfig::new("192.168.1.50")).await?;
/// lamp.poll().await;
///
/// let mut request = TurnOnRequest::new();
/// request.effect("Радуга");
/// lamp.turn_on(&request).await?;
/// # Ok(())
/// # }
/// ```
///
/// [`poll`]: Lamp::poll
pub struct Lamp<T = UdpTransport> {
    name: String,
    address: DeviceAddress,
    registry: EffectRegistry,
    state: LampState,
    failures: u32,
    transport: T,
    history: MessageHistory,
    observer: Option<Box<dyn StateObserver>>,
}

impl Lamp<UdpTransport> {
    /// Create a lamp with its own UDP socket.
    ///
    /// Fails only if the socket cannot be bound.
    pub async fn connect(config: &LampConfig) -> Result<Self> {
        let transport = UdpTransport::bind().await?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Lamp<T> {
    /// Consecutive failed polls after which the lamp is marked unavailable.
    pub const UNAVAILABLE_AFTER: u32 = 3;

    /// Create a lamp that talks through `transport`.
    pub fn with_transport(config: &LampConfig, transport: T) -> Self {
        let lamp = Lamp {
            name: config.name().to_string(),
            address: config.address(),
            registry: config.registry(),
            state: LampState::default(),
            failures: 0,
            transport,
            history: MessageHistory::new(),
            observer: None,
        };
        lamp.log_registry();
        lamp
    }

    /// The name the host shows for this lamp.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where datagrams go.
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// The mirror as of the last successful poll.
    pub fn state(&self) -> &LampState {
        &self.state
    }

    /// The effect registry built from the current configuration.
    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Selectable effect names.
    pub fn effect_list(&self) -> Vec<&str> {
        self.registry.effect_list()
    }

    /// Consecutive failed polls since the last success.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Manufacturer and model, the same for every lamp.
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::GYVER_LAMP
    }

    /// Recent datagrams and the last error.
    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    /// Register the receiver of state changes, replacing any previous one.
    pub fn set_observer<O: StateObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    /// Apply `request` and make sure the lamp is on.
    ///
    /// Commands are sent one at a time. The first failure aborts the rest
    /// and is returned, so the lamp may end up with only part of the
    /// request applied. The mirror is not touched.
    pub async fn turn_on(&mut self, request: &TurnOnRequest) -> Result<()> {
        let commands = request.commands(&self.registry, self.state.is_on());
        self.send_all(&commands).await
    }

    /// Send `P_OFF`. The mirror catches up on the next poll.
    pub async fn turn_off(&mut self) -> Result<()> {
        self.send_all(&[Command::PowerOff]).await
    }

    /// Query the lamp and refresh the mirror.
    ///
    /// Failures are never returned as errors. They count towards
    /// [`UNAVAILABLE_AFTER`](Self::UNAVAILABLE_AFTER) and leave the mirror
    /// as it was, apart from the availability flag.
    pub async fn poll(&mut self) -> PollOutcome {
        let (outcome, changed) = match self.query_status().await {
            Ok(report) => {
                let state = LampState::from_report(&report, &self.registry);
                if !self.state.available() {
                    info!("{} | lamp available again", self.address.host());
                }
                self.failures = 0;
                let changed = state != self.state;
                self.state = state;
                (PollOutcome::Updated { changed }, changed)
            }
            Err(error) => {
                debug!("{} | can't update: {}", self.address.host(), error);
                self.history.record_error(&error.to_string());
                self.failures = self.failures.saturating_add(1);

                let went_away =
                    self.state.available() && self.failures >= Self::UNAVAILABLE_AFTER;
                if went_away {
                    warn!(
                        "{} | lamp unavailable after {} failed polls",
                        self.address.host(),
                        self.failures
                    );
                    self.state.set_available(false);
                }

                let outcome = PollOutcome::Failed {
                    error,
                    consecutive_failures: self.failures,
                    available: self.state.available(),
                };
                (outcome, went_away)
            }
        };

        if changed {
            self.notify();
        }
        outcome
    }

    /// Replace the configuration.
    ///
    /// The effect registry is rebuilt from scratch and the address and name
    /// are swapped. The socket, the mirror and the failure counter are kept.
    pub fn reconfigure(&mut self, config: &LampConfig) {
        self.registry = config.registry();
        self.address = config.address();
        self.name = config.name().to_string();
        self.log_registry();
        self.notify();
    }

    /// Returns diagnostics including state, configuration, and history.
    pub fn diagnostics(&self) -> Value {
        let info = self.device_info();
        json!({
            "name": self.name,
            "address": self.address.to_string(),
            "device": {
                "manufacturer": info.manufacturer,
                "model": info.model,
            },
            "state": serde_json::to_value(&self.state).unwrap_or(Value::Null),
            "consecutive_failures": self.failures,
            "effects": self.registry.effect_list(),
            "random_effect_ids": self.registry.random_ids(),
            "history": serde_json::to_value(self.history.summary()).unwrap_or(Value::Null),
        })
    }

    async fn query_status(&mut self) -> Result<StatusReport> {
        let reply = self.exchange(&Command::Status).await?;
        debug!(
            "{} | UPDATE {:?}",
            self.address.host(),
            String::from_utf8_lossy(&reply)
        );
        StatusReport::parse(&reply)
    }

    async fn send_all(&mut self, commands: &[Command]) -> Result<()> {
        let tokens: Vec<String> = commands.iter().map(Command::to_string).collect();
        debug!("{} | SEND {:?}", self.address.host(), tokens);

        for command in commands {
            let reply = self.exchange(command).await.inspect_err(|e| {
                self.history.record_error(&e.to_string());
            })?;
            debug!(
                "{} | RESP {:?}",
                self.address.host(),
                String::from_utf8_lossy(&reply)
            );
        }
        Ok(())
    }

    async fn exchange(&mut self, command: &Command) -> Result<Vec<u8>> {
        let payload = command.to_bytes();
        self.history.record(MessageType::Send, &payload);
        let reply = self.transport.send(&self.address, &payload).await?;
        self.history.record(MessageType::Receive, &reply);
        Ok(reply)
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer.state_changed(&self.name, &self.state);
        }
    }

    fn log_registry(&self) {
        debug!(
            "{} | effects {:?}, random ids {:?}",
            self.address.host(),
            self.registry.effect_list(),
            self.registry.random_ids()
        );
    }
}

impl<T: fmt::Debug> fmt::Debug for Lamp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lamp")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("state", &self.state)
            .field("failures", &self.failures)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::EffectMapping;
    use crate::types::HueSaturation;

    /// Records every datagram and answers from a script, acking by default.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        sent: Vec<String>,
        targets: Vec<String>,
        replies: VecDeque<Result<Vec<u8>>>,
    }

    impl Transport for ScriptedTransport {
        async fn send(&mut self, address: &DeviceAddress, payload: &[u8]) -> Result<Vec<u8>> {
            self.sent.push(String::from_utf8_lossy(payload).into_owned());
            self.targets.push(address.to_string());
            self.replies.pop_front().unwrap_or_else(|| Ok(b"OK".to_vec()))
        }
    }

    fn lamp() -> Lamp<ScriptedTransport> {
        Lamp::with_transport(&LampConfig::new("10.0.0.2"), ScriptedTransport::default())
    }

    fn reply(lamp: &mut Lamp<ScriptedTransport>, text: &str) {
        lamp.transport.replies.push_back(Ok(text.as_bytes().to_vec()));
    }

    fn fail(lamp: &mut Lamp<ScriptedTransport>) {
        lamp.transport
            .replies
            .push_back(Err(Error::timeout("10.0.0.2:8888", UdpTransport::TIMEOUT_MS)));
    }

    fn sent(lamp: &Lamp<ScriptedTransport>) -> Vec<&str> {
        lamp.transport.sent.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_turn_on_brightness_when_off() {
        let mut lamp = lamp();
        let mut request = TurnOnRequest::new();
        request.brightness(200);

        lamp.turn_on(&request).await.unwrap();
        assert_eq!(sent(&lamp), vec!["BRI200", "P_ON"]);
        assert_eq!(lamp.transport.targets[0], "10.0.0.2:8888");
    }

    #[tokio::test]
    async fn test_turn_on_brightness_when_on() {
        let mut lamp = lamp();
        reply(&mut lamp, "GYVER 0 50 0 0 1");
        assert!(lamp.poll().await.is_success());
        lamp.transport.sent.clear();

        let mut request = TurnOnRequest::new();
        request.brightness(200);
        lamp.turn_on(&request).await.unwrap();
        assert_eq!(sent(&lamp), vec!["BRI200"]);
    }

    #[tokio::test]
    async fn test_turn_on_effects() {
        let mut lamp = lamp();
        let mut request = TurnOnRequest::new();
        request.effect("Конфетти");
        lamp.turn_on(&request).await.unwrap();

        let mut request = TurnOnRequest::new();
        request.effect("unknown-token");
        lamp.turn_on(&request).await.unwrap();

        assert_eq!(sent(&lamp), vec!["EFF0", "P_ON", "unknown-token", "P_ON"]);
    }

    #[tokio::test]
    async fn test_turn_on_color() {
        let mut lamp = lamp();
        reply(&mut lamp, "GYVER 0 50 0 0 1");
        lamp.poll().await;
        lamp.transport.sent.clear();

        let request = TurnOnRequest::from(&HueSaturation::create(180.0, 50.0).unwrap());
        lamp.turn_on(&request).await.unwrap();
        assert_eq!(sent(&lamp), vec!["SCA50", "SPD127"]);
    }

    #[tokio::test]
    async fn test_turn_off() {
        let mut lamp = lamp();
        lamp.turn_off().await.unwrap();
        assert_eq!(sent(&lamp), vec!["P_OFF"]);
        assert_eq!(lamp.history().summary().receive_count, 1);
    }

    #[tokio::test]
    async fn test_failure_abandons_rest_of_batch() {
        let mut lamp = lamp();
        reply(&mut lamp, "OK");
        fail(&mut lamp);

        let mut request = TurnOnRequest::new();
        request.brightness(80);
        request.effect("Огонь");
        let err = lamp.turn_on(&request).await.unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }));
        assert_eq!(sent(&lamp), vec!["BRI80", "EFF1"]);
        assert!(lamp.history().last_error().is_some());
        // Commands never touch the mirror.
        assert_eq!(lamp.state(), &LampState::default());
    }

    #[tokio::test]
    async fn test_poll_updates_mirror() {
        let mut config = LampConfig::new("10.0.0.2");
        config.effects_map = vec![EffectMapping::new("Радуга", 3, false)];
        let mut lamp = Lamp::with_transport(&config, ScriptedTransport::default());
        reply(&mut lamp, "x 3 120 200 80 1");

        let outcome = lamp.poll().await;
        assert!(matches!(outcome, PollOutcome::Updated { changed: true }));
        assert_eq!(sent(&lamp), vec!["GET"]);

        let state = lamp.state();
        assert_eq!(state.effect(), Some("Радуга"));
        assert_eq!(state.brightness(), 120);
        assert!((state.saturation() - 200.0 / 255.0 * 100.0).abs() < 1e-9);
        assert!((state.hue() - 288.0).abs() < 1e-9);
        assert!(state.is_on());
        assert!(state.available());
    }

    #[tokio::test]
    async fn test_malformed_reply_keeps_mirror() {
        let mut lamp = lamp();
        reply(&mut lamp, "x 1 120 200 80 1");
        lamp.poll().await;
        let before = lamp.state().clone();

        reply(&mut lamp, "x 1 120 200");
        let outcome = lamp.poll().await;
        match outcome {
            PollOutcome::Failed {
                error,
                consecutive_failures,
                available,
            } => {
                assert!(matches!(error, Error::MalformedResponse { .. }));
                assert_eq!(consecutive_failures, 1);
                assert!(available);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(lamp.state(), &before);
    }

    #[tokio::test]
    async fn test_negative_effect_id_is_a_good_poll() {
        let mut lamp = lamp();
        fail(&mut lamp);
        lamp.poll().await;
        assert_eq!(lamp.failures(), 1);

        reply(&mut lamp, "x -1 120 200 80 1");
        let outcome = lamp.poll().await;
        assert!(matches!(outcome, PollOutcome::Updated { changed: true }));
        assert_eq!(lamp.failures(), 0);
        assert_eq!(lamp.state().effect(), None);
        assert_eq!(lamp.state().brightness(), 120);
        assert!(lamp.state().is_on());
    }

    #[tokio::test]
    async fn test_availability_state_machine() {
        let mut lamp = lamp();

        fail(&mut lamp);
        fail(&mut lamp);
        lamp.poll().await;
        lamp.poll().await;
        assert!(lamp.state().available());
        assert_eq!(lamp.failures(), 2);

        reply(&mut lamp, "x abc 1 2 3 1");
        let outcome = lamp.poll().await;
        assert!(matches!(
            outcome,
            PollOutcome::Failed {
                consecutive_failures: 3,
                available: false,
                ..
            }
        ));
        assert!(!lamp.state().available());

        fail(&mut lamp);
        lamp.poll().await;
        assert_eq!(lamp.failures(), 4);
        assert!(!lamp.state().available());

        reply(&mut lamp, "x 0 10 0 0 0");
        assert!(lamp.poll().await.is_success());
        assert!(lamp.state().available());
        assert_eq!(lamp.failures(), 0);
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let mut lamp = lamp();
        fail(&mut lamp);
        fail(&mut lamp);
        reply(&mut lamp, "x 0 10 0 0 0");
        fail(&mut lamp);
        fail(&mut lamp);
        for _ in 0..5 {
            lamp.poll().await;
        }
        assert_eq!(lamp.failures(), 2);
        assert!(lamp.state().available());
    }

    #[tokio::test]
    async fn test_observer_sees_changes_only() {
        let seen: Arc<Mutex<Vec<bool>>> = Arc::default();
        let mut lamp = lamp();
        let sink = Arc::clone(&seen);
        lamp.set_observer(move |_: &str, state: &LampState| {
            sink.lock().unwrap().push(state.available());
        });

        reply(&mut lamp, "x 0 10 0 0 1");
        reply(&mut lamp, "x 0 10 0 0 1");
        lamp.poll().await;
        lamp.poll().await;
        assert_eq!(*seen.lock().unwrap(), vec![true]);

        for _ in 0..4 {
            fail(&mut lamp);
            lamp.poll().await;
        }
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);

        reply(&mut lamp, "x 0 10 0 0 1");
        lamp.poll().await;
        assert_eq!(*seen.lock().unwrap(), vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_reconfigure() {
        let mut lamp = lamp();
        reply(&mut lamp, "x 0 10 0 0 1");
        lamp.poll().await;

        let mut config = LampConfig::new("10.0.0.9");
        config.name = Some(String::from("Hall"));
        config.effects = Some(vec![String::from("Один"), String::from("Два")]);
        config.use_random_effect = true;
        config.random_effects = vec![String::from("Два")];
        lamp.reconfigure(&config);

        assert_eq!(lamp.name(), "Hall");
        assert_eq!(lamp.effect_list(), vec!["Один", "Два"]);
        assert!(lamp.state().is_on());

        lamp.turn_on(&TurnOnRequest::new()).await.unwrap();
        assert_eq!(sent(&lamp), vec!["GET", "EFF1"]);
        assert_eq!(lamp.transport.targets.last().unwrap(), "10.0.0.9:8888");
    }

    #[tokio::test]
    async fn test_diagnostics() {
        let mut lamp = lamp();
        fail(&mut lamp);
        lamp.poll().await;

        let diag = lamp.diagnostics();
        assert_eq!(diag["name"], "Gyver Lamp Ex");
        assert_eq!(diag["address"], "10.0.0.2:8888");
        assert_eq!(diag["device"]["model"], "GyverLamp");
        assert_eq!(diag["consecutive_failures"], 1);
        assert_eq!(diag["effects"].as_array().unwrap().len(), 18);
        assert!(diag["history"]["last_error"].is_string());
    }
}
