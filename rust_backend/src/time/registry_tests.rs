#[cfg(test)]
mod tests {
    use crate::core::error::EngineError;
    use crate::time::registry::{TimezoneRegistry, ZoneRuleSource};
    use chrono_tz::Tz;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_resolve_known_zone() {
        let registry = TimezoneRegistry::new();
        let zone = registry.resolve("America/Sao_Paulo").unwrap();
        assert_eq!(zone.identifier(), "America/Sao_Paulo");
    }

    #[test]
    fn test_utc_sentinel_always_valid() {
        let registry = TimezoneRegistry::new();
        assert!(registry.is_valid("UTC"));
    }

    #[test]
    fn test_unknown_zone_is_error() {
        let registry = TimezoneRegistry::new();
        let err = registry.resolve("Mars/Olympus_Mons").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTimezone {
                identifier: "Mars/Olympus_Mons".to_string()
            }
        );
        assert!(registry.resolve("").is_err());
    }

    #[test]
    fn test_failures_are_not_cached() {
        let registry = TimezoneRegistry::new();
        let _ = registry.resolve("Not/AZone");
        assert_eq!(registry.cached_len(), 0);

        registry.resolve("Asia/Tokyo").unwrap();
        registry.resolve("Asia/Tokyo").unwrap();
        assert_eq!(registry.cached_len(), 1);
    }

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    impl ZoneRuleSource for CountingSource {
        fn rules_for(&self, identifier: &str) -> Option<Tz> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            identifier.parse().ok()
        }
    }

    #[test]
    fn test_cache_serves_repeat_lookups() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = TimezoneRegistry::with_source(CountingSource {
            calls: Arc::clone(&calls),
        });

        let first = registry.resolve("Europe/Berlin").unwrap();
        let second = registry.resolve("Europe/Berlin").unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_resolution() {
        let registry = Arc::new(TimezoneRegistry::new());
        let ids = ["Asia/Tokyo", "Europe/London", "America/New_York", "UTC"];

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve(ids[i % ids.len()]).unwrap())
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap().identifier(), ids[i % ids.len()]);
        }
        assert_eq!(registry.cached_len(), ids.len());
    }

    #[test]
    fn test_shared_registry_is_one_cache() {
        let a = TimezoneRegistry::shared();
        let b = TimezoneRegistry::shared();
        assert!(Arc::ptr_eq(&a, &b));

        a.resolve("Pacific/Chatham").unwrap();
        assert!(b.cached_len() >= 1);
    }

    #[test]
    fn test_default_engines_share_registry() {
        use crate::services::Engine;
        let first = Engine::default();
        let second = crate::EngineConfig::default().build_engine().unwrap();
        assert!(std::ptr::eq(first.registry(), second.registry()));
    }
}
