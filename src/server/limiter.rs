//! # Límite de Conexiones
//! src/server/limiter.rs
//!
//! Contador atómico de conexiones activas. Con `max = 0` no hay límite y
//! sólo sirve para saber cuántos threads de conexión siguen vivos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cuenta conexiones activas y opcionalmente las acota
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    active: Arc<AtomicUsize>,
    max: usize,
}

/// Permiso de una conexión. Al soltarlo se libera el lugar.
#[derive(Debug)]
pub struct Permit {
    active: Arc<AtomicUsize>,
}

impl ConnectionLimiter {
    /// `max = 0` significa sin límite
    pub fn new(max: usize) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            max,
        }
    }

    /// Reserva un lugar, o `None` si ya se alcanzó el máximo
    pub fn try_acquire(&self) -> Option<Permit> {
        let acquired = self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (self.max == 0 || active < self.max).then_some(active + 1)
            })
            .is_ok();

        acquired.then(|| Permit {
            active: Arc::clone(&self.active),
        })
    }

    /// Conexiones activas en este momento
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
