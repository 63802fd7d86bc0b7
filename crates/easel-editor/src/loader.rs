//! Pending image loads.
//!
//! Adding an image is the one asynchronous seam inside the session: the
//! host fetches and decodes the resource, then reports back with the token
//! it was handed. Tokens carry a generation number; loading a document or
//! tearing the session down bumps the generation, so a completion that
//! arrives late resolves to nothing instead of inserting into a scene it
//! was never meant for.

/// Handle for one in-flight image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken {
    serial: u64,
    generation: u32,
}

impl LoadToken {
    /// Stable per-load number, usable as a key across an FFI boundary.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

#[derive(Debug, Default)]
pub struct PendingLoads {
    next_serial: u64,
    generation: u32,
    inflight: Vec<(LoadToken, String)>,
}

impl PendingLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a load for `url` and hand out its token.
    pub fn begin(&mut self, url: &str) -> LoadToken {
        self.next_serial += 1;
        let token = LoadToken {
            serial: self.next_serial,
            generation: self.generation,
        };
        self.inflight.push((token, url.to_string()));
        token
    }

    /// Consume a completed load, returning its URL. `None` if the token was
    /// cancelled, already consumed, or belongs to a previous generation.
    pub fn complete(&mut self, token: LoadToken) -> Option<String> {
        if token.generation != self.generation {
            log::warn!("ignoring stale image load (generation {})", token.generation);
            return None;
        }
        let idx = self.inflight.iter().position(|(t, _)| *t == token)?;
        Some(self.inflight.remove(idx).1)
    }

    /// Drop a single pending load. Returns true if it was still in flight.
    pub fn cancel(&mut self, token: LoadToken) -> bool {
        let before = self.inflight.len();
        self.inflight.retain(|(t, _)| *t != token);
        self.inflight.len() != before
    }

    /// Invalidate every outstanding token. Called on document load and
    /// session teardown.
    pub fn invalidate_all(&mut self) {
        if !self.inflight.is_empty() {
            log::debug!("cancelling {} in-flight image loads", self.inflight.len());
        }
        self.inflight.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn complete_consumes_once() {
        let mut loads = PendingLoads::new();
        let t = loads.begin("https://img.example/a.png");
        assert_eq!(loads.complete(t).as_deref(), Some("https://img.example/a.png"));
        assert_eq!(loads.complete(t), None);
    }

    #[test]
    fn cancel_drops_the_load() {
        let mut loads = PendingLoads::new();
        let t = loads.begin("u");
        assert!(loads.cancel(t));
        assert!(!loads.cancel(t));
        assert_eq!(loads.complete(t), None);
    }

    #[test]
    fn stale_generation_never_resolves() {
        let mut loads = PendingLoads::new();
        let old = loads.begin("u1");
        loads.invalidate_all();
        let fresh = loads.begin("u2");

        assert_eq!(loads.complete(old), None);
        assert_eq!(loads.complete(fresh).as_deref(), Some("u2"));
    }
}
