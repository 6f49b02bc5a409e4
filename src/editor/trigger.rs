use super::selection::{first_cursor, Selection};
use crate::config::ExecutePayload;
use crate::detector::{DetectedQuery, QueryRegistry};
use crate::error::QueryLensError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic request ids, scoped to one editor session.
#[derive(Debug)]
pub struct RequestIds {
    next: u64,
}

impl Default for RequestIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl RequestIds {
    pub fn next_id(&mut self) -> RequestId {
        let id = RequestId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::default())
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers { ctrl: true, ..Modifiers::default() })
    }

    pub fn meta(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers { meta: true, ..Modifiers::default() })
    }
}

/// A key binding such as `Mod-Enter` or `Ctrl-Shift-e`.
///
/// `Mod` accepts either Ctrl or Meta, so one binding covers every platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    key: String,
    modifiers: Modifiers,
    primary: bool,
}

impl KeyChord {
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let key_matches = if self.key.chars().count() == 1 {
            self.key.eq_ignore_ascii_case(&event.key)
        } else {
            self.key == event.key
        };
        let primary_matches = if self.primary {
            event.modifiers.ctrl || event.modifiers.meta
        } else {
            event.modifiers.ctrl == self.modifiers.ctrl && event.modifiers.meta == self.modifiers.meta
        };
        key_matches
            && primary_matches
            && event.modifiers.alt == self.modifiers.alt
            && event.modifiers.shift == self.modifiers.shift
    }
}

impl FromStr for KeyChord {
    type Err = QueryLensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QueryLensError::InvalidKeyBinding(s.to_string());
        let (prefix, key) = if let Some(prefix) = s.strip_suffix("--") {
            (prefix, "-")
        } else {
            match s.rsplit_once('-') {
                Some((prefix, key)) => (prefix, key),
                None => ("", s),
            }
        };
        if key.is_empty() {
            return Err(invalid());
        }

        let mut chord = KeyChord {
            key: key.to_string(),
            modifiers: Modifiers::default(),
            primary: false,
        };
        for name in prefix.split('-').filter(|part| !part.is_empty()) {
            match name {
                "Mod" => chord.primary = true,
                "Ctrl" | "Control" | "c" => chord.modifiers.ctrl = true,
                "Alt" | "a" => chord.modifiers.alt = true,
                "Shift" | "s" => chord.modifiers.shift = true,
                "Meta" | "Cmd" | "m" => chord.modifiers.meta = true,
                _ => return Err(invalid()),
            }
        }
        Ok(chord)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Invoked,
    Dispatched,
    NoOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Not the run binding; the host should handle the key itself.
    Ignored,
    /// Run binding pressed outside any query. The key is still consumed.
    NoOp,
    Dispatched {
        request_id: RequestId,
        query: DetectedQuery,
    },
}

impl TriggerOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, TriggerOutcome::Ignored)
    }
}

pub type ExecuteCallback = Box<dyn FnMut(&str)>;

/// Runs the query under the cursor when the run binding is pressed.
pub struct ExecutionTrigger {
    chord: KeyChord,
    payload: ExecutePayload,
    callbacks: Vec<ExecuteCallback>,
    state: TriggerState,
}

impl ExecutionTrigger {
    pub fn new(chord: KeyChord, payload: ExecutePayload) -> Self {
        Self {
            chord,
            payload,
            callbacks: Vec::new(),
            state: TriggerState::Idle,
        }
    }

    /// Callbacks run synchronously, in registration order.
    pub fn on_execute(&mut self, callback: impl FnMut(&str) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
        registry: &QueryRegistry,
        selection: &Selection,
        request_ids: &mut RequestIds,
    ) -> TriggerOutcome {
        if !self.chord.matches(event) {
            return TriggerOutcome::Ignored;
        }
        self.transition(TriggerState::Invoked);

        let cursor = first_cursor(selection);
        let outcome = match registry.at(cursor) {
            None => {
                self.transition(TriggerState::NoOp);
                TriggerOutcome::NoOp
            }
            Some(query) => {
                let request_id = request_ids.next_id();
                let text = payload_text(query, self.payload);
                debug!(%request_id, query = %query.label(), cursor, "dispatching query");
                for callback in &mut self.callbacks {
                    callback(text);
                }
                self.transition(TriggerState::Dispatched);
                TriggerOutcome::Dispatched {
                    request_id,
                    query: query.clone(),
                }
            }
        };

        self.transition(TriggerState::Idle);
        outcome
    }

    fn transition(&mut self, next: TriggerState) {
        trace!(from = ?self.state, to = ?next, "trigger transition");
        self.state = next;
    }
}

fn payload_text(query: &DetectedQuery, payload: ExecutePayload) -> &str {
    match payload {
        ExecutePayload::Call => &query.text,
        ExecutePayload::Argument => query.raw_argument_text.as_deref().unwrap_or(&query.text),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mod_enter() {
        let chord: KeyChord = "Mod-Enter".parse().unwrap();
        assert!(chord.matches(&KeyEvent::ctrl("Enter")));
        assert!(chord.matches(&KeyEvent::meta("Enter")));
        assert!(!chord.matches(&KeyEvent::plain("Enter")));
        assert!(!chord.matches(&KeyEvent::ctrl("Tab")));
    }

    #[test]
    fn parse_explicit_modifiers() {
        let chord: KeyChord = "Ctrl-Shift-e".parse().unwrap();
        let event = KeyEvent::new("E", Modifiers { ctrl: true, shift: true, ..Modifiers::default() });
        assert!(chord.matches(&event));
        assert!(!chord.matches(&KeyEvent::ctrl("e")));
    }

    #[test]
    fn parse_minus_key() {
        let chord: KeyChord = "Ctrl--".parse().unwrap();
        assert!(chord.matches(&KeyEvent::ctrl("-")));
    }

    #[test]
    fn parse_single_key() {
        let chord: KeyChord = "F5".parse().unwrap();
        assert!(chord.matches(&KeyEvent::plain("F5")));
    }

    #[test]
    fn parse_rejects_unknown_modifier() {
        assert!("Hyper-Enter".parse::<KeyChord>().is_err());
        assert!("".parse::<KeyChord>().is_err());
    }

    #[test]
    fn request_ids_are_monotonic() {
        let mut ids = RequestIds::default();
        assert_eq!(ids.next_id(), RequestId(1));
        assert_eq!(ids.next_id(), RequestId(2));
        assert_eq!(RequestId(7).to_string(), "#7");
    }

    #[test]
    fn outcome_handled() {
        assert!(!TriggerOutcome::Ignored.is_handled());
        assert!(TriggerOutcome::NoOp.is_handled());
    }
}
