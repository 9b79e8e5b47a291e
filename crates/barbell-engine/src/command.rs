use barbell_icd::ControlCommand;
use portable_atomic::{AtomicU8, Ordering};

const EMPTY: u8 = 0;

/// Single-slot handoff for commands arriving from other execution contexts
/// (BLE write callback, serial console).
///
/// Writers post; the engine drains the slot at the start of each
/// [`Engine::process`](crate::Engine::process). A newer post overwrites an
/// undrained one. Bytes that are not a known [`ControlCommand`] are dropped
/// here and never reach engine state.
#[derive(Debug)]
pub struct CommandSlot {
    pending: AtomicU8,
}

impl CommandSlot {
    pub const fn new() -> Self {
        Self { pending: AtomicU8::new(EMPTY) }
    }

    /// Posts a raw control byte. Returns `false` if the byte was ignored.
    pub fn post_byte(&self, byte: u8) -> bool {
        match ControlCommand::try_from(byte) {
            Ok(command) => {
                self.post(command);
                true
            }
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("ignoring control byte {=u8:#x}", byte);
                false
            }
        }
    }

    pub fn post(&self, command: ControlCommand) {
        self.pending.store(command.into(), Ordering::Release);
    }

    /// Takes the pending command, leaving the slot empty.
    pub fn take(&self) -> Option<ControlCommand> {
        match self.pending.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            byte => ControlCommand::try_from(byte).ok(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) != EMPTY
    }
}

impl Default for CommandSlot {
    fn default() -> Self {
        Self::new()
    }
}
