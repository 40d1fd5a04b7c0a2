//! End-to-end resolution against an in-process fake reputation service,
//! including cache persistence between runs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use urlvet_core::cache::VerdictCache;
use urlvet_core::lookup::{BatchClient, LookupError, Transport};
use urlvet_core::normalize::NormalizedUrl;
use urlvet_core::verdict::Verdict;
use urlvet_core::{normalize, resolve};

const TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Fake service: answers every submitted URL from a fixed verdict table,
/// producing the double-encoded wire format the real endpoint uses.
struct FakeService {
    threats: BTreeMap<&'static str, &'static str>,
    requests: Rc<RefCell<usize>>,
}

impl FakeService {
    fn new(threats: &[(&'static str, &'static str)]) -> Self {
        Self {
            threats: threats.iter().copied().collect(),
            requests: Rc::new(RefCell::new(0)),
        }
    }

    fn request_count(&self) -> Rc<RefCell<usize>> {
        Rc::clone(&self.requests)
    }
}

impl Transport for FakeService {
    fn post_lookup(&self, urls: &[NormalizedUrl]) -> Result<String, LookupError> {
        *self.requests.borrow_mut() += 1;
        let mut resp_map = serde_json::Map::new();
        for url in urls {
            let mut entry = serde_json::Map::new();
            if let Some(threat) = self.threats.get(url.as_str()) {
                entry.insert("threatName".to_string(), serde_json::json!(threat));
            }
            entry.insert("zurldblist".to_string(), serde_json::json!(["OBSERVED"]));
            resp_map.insert(url.to_string(), serde_json::Value::Object(entry));
        }
        let inner = serde_json::json!({ "respMap": resp_map }).to_string();
        Ok(serde_json::json!({ "responseData": inner }).to_string())
    }
}

#[test]
fn resolve_then_rerun_from_persisted_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("verdicts.json");
    let inputs = ["good.example.com", "bad.example.com"];

    // First run: everything is a miss.
    {
        let service = FakeService::new(&[("bad.example.com", "HTML.Phishing.Bank")]);
        let client = BatchClient::new(service, 90);
        let mut cache = VerdictCache::load(&cache_path);

        let res = resolve(inputs, &mut cache, &client, TTL, 1_000);
        assert_eq!(res.stats.lookups, 2);
        assert_eq!(res.stats.cache_hits, 0);
        assert_eq!(
            res.verdicts[&normalize("good.example.com").unwrap()].verdict,
            Verdict::Benign
        );
        assert_eq!(
            res.verdicts[&normalize("bad.example.com").unwrap()].verdict,
            Verdict::Malicious
        );

        cache.save(&cache_path).unwrap();
    }

    // Second run, fresh process: everything is served from the cache file.
    {
        let service = FakeService::new(&[]);
        let requests = service.request_count();
        let client = BatchClient::new(service, 90);
        let mut cache = VerdictCache::load(&cache_path);
        assert_eq!(cache.len(), 2);

        let res = resolve(inputs, &mut cache, &client, TTL, 2_000);
        assert_eq!(res.stats.cache_hits, 2);
        assert_eq!(res.stats.lookups, 0);
        assert_eq!(*requests.borrow(), 0);
        assert_eq!(
            res.verdicts[&normalize("bad.example.com").unwrap()].verdict,
            Verdict::Malicious
        );
    }
}

#[test]
fn large_list_is_chunked_and_merged() {
    let raws: Vec<String> = (0..205).map(|i| format!("host{i}.example.com")).collect();
    let service = FakeService::new(&[]);
    let requests = service.request_count();
    let client = BatchClient::new(service, 90);
    let mut cache = VerdictCache::new();

    let res = resolve(raws.iter(), &mut cache, &client, TTL, 0);
    assert_eq!(res.stats.lookups, 205);
    assert_eq!(res.verdicts.len(), 205);
    // ceil(205 / 90) outbound requests.
    assert_eq!(*requests.borrow(), 3);
}

#[test]
fn expired_cache_file_triggers_relookup_on_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("verdicts.json");
    let ttl = Duration::from_secs(100);

    {
        let service = FakeService::new(&[]);
        let client = BatchClient::new(service, 90);
        let mut cache = VerdictCache::new();
        resolve(["aging.example.com"], &mut cache, &client, ttl, 0);
        cache.save(&cache_path).unwrap();
    }

    {
        let service = FakeService::new(&[("aging.example.com", "New.Threat")]);
        let requests = service.request_count();
        let client = BatchClient::new(service, 90);
        let mut cache = VerdictCache::load(&cache_path);

        let res = resolve(["aging.example.com"], &mut cache, &client, ttl, 1_000);
        assert_eq!(res.stats.cache_hits, 0);
        assert_eq!(res.stats.lookups, 1);
        assert_eq!(*requests.borrow(), 1);
        assert_eq!(
            res.verdicts[&normalize("aging.example.com").unwrap()].verdict,
            Verdict::Malicious
        );
    }
}
