//! Instance ownership bookkeeping

use core::cell::Cell;

use critical_section::Mutex;
use kdac_hal::DacInstance;

/// Records which DAC instances are held by an active channel.
///
/// A channel claims its instance when it activates and releases it when it
/// deactivates; a second channel targeting the same instance is refused.
pub struct ClaimRegistry {
    claimed: Mutex<Cell<u8>>,
}

impl ClaimRegistry {
    /// Create a registry with nothing claimed
    pub const fn new() -> Self {
        Self {
            claimed: Mutex::new(Cell::new(0)),
        }
    }

    /// Claim an instance, returning `false` if it is already held
    pub fn try_claim(&self, instance: DacInstance) -> bool {
        critical_section::with(|cs| {
            let cell = self.claimed.borrow(cs);
            let bits = cell.get();
            if bits & instance.mask() != 0 {
                false
            } else {
                cell.set(bits | instance.mask());
                true
            }
        })
    }

    /// Release a claimed instance
    pub fn release(&self, instance: DacInstance) {
        critical_section::with(|cs| {
            let cell = self.claimed.borrow(cs);
            cell.set(cell.get() & !instance.mask());
        });
    }

    /// Check if an instance is currently held
    pub fn is_claimed(&self, instance: DacInstance) -> bool {
        critical_section::with(|cs| self.claimed.borrow(cs).get() & instance.mask() != 0)
    }

    /// Claim an instance for as long as the returned guard lives
    pub fn claim(&'static self, instance: DacInstance) -> Option<Claim> {
        self.try_claim(instance).then(|| Claim {
            registry: self,
            instance,
        })
    }
}

impl Default for ClaimRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A held claim, released when dropped
pub struct Claim {
    registry: &'static ClaimRegistry,
    instance: DacInstance,
}

impl Claim {
    pub fn instance(&self) -> DacInstance {
        self.instance
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.registry.release(self.instance);
    }
}

/// Registry used by channels created with [`DacChannel::new`](crate::DacChannel::new)
pub static CLAIMS: ClaimRegistry = ClaimRegistry::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_release_cycle() {
        let claims = ClaimRegistry::new();
        assert!(!claims.is_claimed(DacInstance::DAC0));
        assert!(claims.try_claim(DacInstance::DAC0));
        assert!(!claims.try_claim(DacInstance::DAC0));
        assert!(claims.try_claim(DacInstance::DAC1));

        claims.release(DacInstance::DAC0);
        assert!(!claims.is_claimed(DacInstance::DAC0));
        assert!(claims.is_claimed(DacInstance::DAC1));
        assert!(claims.try_claim(DacInstance::DAC0));
    }

    #[test]
    fn test_claim_guard_releases_on_drop() {
        static REGISTRY: ClaimRegistry = ClaimRegistry::new();

        let guard = REGISTRY.claim(DacInstance::DAC1).unwrap();
        assert_eq!(guard.instance(), DacInstance::DAC1);
        assert!(REGISTRY.is_claimed(DacInstance::DAC1));
        assert!(REGISTRY.claim(DacInstance::DAC1).is_none());

        drop(guard);
        assert!(!REGISTRY.is_claimed(DacInstance::DAC1));
        assert!(REGISTRY.claim(DacInstance::DAC1).is_some());
    }
}
