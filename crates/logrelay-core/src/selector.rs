//! Weighted random target selection over a registry snapshot.
//!
//! Stateless by design: no coordination between workers is needed because
//! every draw is an independent weighted random choice over whatever
//! snapshot the caller happened to take. This converges to the configured
//! proportions over large samples but is not exact for small ones.

use rand::Rng;

use crate::error::NoHealthyTarget;
use crate::registry::RegistrySnapshot;

/// Picks one eligible target from `snapshot`, excluding any name already in
/// `excluded`.
///
/// A target is eligible iff it is healthy, has `weight > 0`, and is not in
/// `excluded`. Draws `r` uniformly from `[0, sum(weight))` and returns the
/// first eligible target (in registration order) whose cumulative weight
/// strictly exceeds `r`; the last eligible target catches any residual
/// floating-point mass.
pub fn select<'a>(snapshot: &'a RegistrySnapshot, excluded: &[String]) -> Result<&'a str, NoHealthyTarget> {
    let candidates: Vec<_> = snapshot
        .targets()
        .iter()
        .filter(|t| t.healthy && t.weight > 0.0 && !excluded.iter().any(|e| e == &t.name))
        .collect();

    if candidates.is_empty() {
        return Err(NoHealthyTarget);
    }

    let total: f64 = candidates.iter().map(|t| t.weight).sum();
    let r = rand::thread_rng().gen_range(0.0..total);

    let mut cumulative = 0.0;
    for candidate in &candidates {
        cumulative += candidate.weight;
        if r < cumulative {
            return Ok(&candidate.name);
        }
    }

    // Residual floating-point mass: hand it to the last candidate.
    Ok(&candidates.last().expect("candidates is non-empty").name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TargetRegistry;

    fn registry_of(weights: &[(&str, f64, bool)]) -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        for (name, weight, healthy) in weights {
            registry.register(*name, format!("http://{name}"), *weight).unwrap();
            if !healthy {
                registry.set_health(name, false).unwrap();
            }
        }
        registry
    }

    #[test]
    fn no_healthy_target_when_all_unhealthy() {
        let registry = registry_of(&[("a", 1.0, false), ("b", 1.0, false)]);
        let snap = registry.snapshot();
        assert!(select(&snap, &[]).is_err());
    }

    #[test]
    fn zero_weight_target_never_selected() {
        let registry = registry_of(&[("a", 0.0, true), ("b", 1.0, true)]);
        let snap = registry.snapshot();
        for _ in 0..200 {
            assert_eq!(select(&snap, &[]).unwrap(), "b");
        }
    }

    #[test]
    fn excluded_target_is_skipped() {
        let registry = registry_of(&[("a", 1.0, true), ("b", 1.0, true)]);
        let snap = registry.snapshot();
        let excluded = vec!["a".to_string()];
        for _ in 0..200 {
            assert_eq!(select(&snap, &excluded).unwrap(), "b");
        }
    }

    #[test]
    fn excluding_all_candidates_yields_no_healthy_target() {
        let registry = registry_of(&[("a", 1.0, true)]);
        let snap = registry.snapshot();
        let excluded = vec!["a".to_string()];
        assert!(select(&snap, &excluded).is_err());
    }

    #[test]
    fn weighted_distribution_converges_over_large_samples() {
        let registry = registry_of(&[("a", 0.4, true), ("b", 0.3, true), ("c", 0.2, true), ("d", 0.1, true)]);
        let snap = registry.snapshot();

        let mut counts = std::collections::HashMap::new();
        const N: usize = 20_000;
        for _ in 0..N {
            let name = select(&snap, &[]).unwrap();
            *counts.entry(name.to_string()).or_insert(0usize) += 1;
        }

        let share = |name: &str| counts.get(name).copied().unwrap_or(0) as f64 / N as f64;
        assert!((share("a") - 0.4).abs() < 0.02, "a share was {}", share("a"));
        assert!((share("b") - 0.3).abs() < 0.02, "b share was {}", share("b"));
        assert!((share("c") - 0.2).abs() < 0.02, "c share was {}", share("c"));
        assert!((share("d") - 0.1).abs() < 0.02, "d share was {}", share("d"));
    }
}
