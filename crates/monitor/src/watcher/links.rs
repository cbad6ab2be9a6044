use config::LinkPolicy;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Debug, Clone)]
struct Link {
    original: PathBuf,
    created: Instant,
}

/// Bounded map from a temp artifact to the original file it shadows.
///
/// Links expire after the policy's ttl, the oldest link is evicted beyond its
/// capacity, and callers drop a link once its artifact goes away.
#[derive(Debug)]
pub struct TempLinks {
    entries: HashMap<PathBuf, Link>,
    policy: LinkPolicy,
}

impl TempLinks {
    pub fn new(policy: LinkPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy: policy.clamp(),
        }
    }

    pub fn insert(&mut self, temp: PathBuf, original: PathBuf, now: Instant) {
        self.prune(now);
        self.entries.insert(temp, Link { original, created: now });

        while self.entries.len() > self.policy.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, link)| link.created)
                .map(|(path, _)| path.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn get(&self, temp: &Path) -> Option<&Path> {
        self.entries.get(temp).map(|link| link.original.as_path())
    }

    pub fn remove(&mut self, temp: &Path) -> Option<PathBuf> {
        self.entries.remove(temp).map(|link| link.original)
    }

    /// Drop links older than the ttl, returning how many were dropped.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.policy.ttl;
        self.entries
            .retain(|_, link| now.saturating_duration_since(link.created) <= ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn policy(capacity: usize, ttl: u64) -> LinkPolicy {
        LinkPolicy {
            capacity,
            ttl: Duration::from_secs(ttl),
        }
    }

    #[test]
    fn expired_links_are_pruned() {
        let start = Instant::now();
        let mut links = TempLinks::new(policy(8, 10));
        links.insert("/a.tmp".into(), "/a".into(), start);
        links.insert("/b.tmp".into(), "/b".into(), start + Duration::from_secs(5));

        assert_eq!(links.prune(start + Duration::from_secs(12)), 1);
        assert_eq!(links.get(Path::new("/a.tmp")), None);
        assert_eq!(links.get(Path::new("/b.tmp")), Some(Path::new("/b")));
    }

    #[test]
    fn oldest_link_is_evicted_at_capacity() {
        let start = Instant::now();
        let mut links = TempLinks::new(policy(2, 600));
        for (i, name) in ["x", "y", "z"].into_iter().enumerate() {
            links.insert(
                format!("/{name}.tmp").into(),
                format!("/{name}").into(),
                start + Duration::from_secs(i as u64),
            );
        }

        assert_eq!(links.len(), 2);
        assert_eq!(links.get(Path::new("/x.tmp")), None);
        assert!(links.get(Path::new("/z.tmp")).is_some());
    }

    #[test]
    fn remove_returns_original() {
        let mut links = TempLinks::new(LinkPolicy::default());
        links.insert("/a.tmp".into(), "/a".into(), Instant::now());

        assert_eq!(links.remove(Path::new("/a.tmp")), Some(PathBuf::from("/a")));
        assert!(links.is_empty());
    }
}
