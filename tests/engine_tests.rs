use std::sync::Arc;
use std::thread;

use nsperms::flags::{DENY, READ, WRITE};
use nsperms::test_support::{init_tracing, item_list};
use nsperms::{
    CheckOptions, Engine, InMemoryGrantSource, ListHandler, NamespaceHook, NspConfig, NspError, Principal,
    PrincipalId, Resource, ResourceParts, Ruleset, Target,
};
use serde_json::json;

struct Invoice {
    id: u64,
    id_str: String,
}

impl Invoice {
    fn new(id: u64) -> Self {
        Invoice { id, id_str: id.to_string() }
    }
}

impl Resource for Invoice {
    fn namespace_hook(&self) -> NamespaceHook<'_> {
        NamespaceHook::Convention(ResourceParts {
            container: "billing",
            kind: "invoice",
            id: Some(&self.id_str),
        })
    }
}

struct InvoiceClass;

impl Resource for InvoiceClass {
    fn namespace_hook(&self) -> NamespaceHook<'_> {
        NamespaceHook::Class {
            base: "billing.invoice".to_string(),
            create: Some("billing.invoice.new".to_string()),
        }
    }
}

fn engine_for(id: PrincipalId) -> Engine<InMemoryGrantSource> {
    let mut source = InMemoryGrantSource::new();
    source
        .grant_group("accountants", "billing.invoice", READ)
        .grant_group("accountants", "billing.invoice.*.total", READ | WRITE)
        .add_member(id, "accountants")
        .grant_principal(id, "billing.invoice.13", DENY)
        .grant_principal(id, "billing.invoice.new", WRITE);
    Engine::new(NspConfig::default(), source)
}

#[test]
fn test_resource_checks() {
    init_tracing();
    let id = PrincipalId::new_v4();
    let engine = engine_for(id);
    let user = Principal::user(id);
    let opts = CheckOptions::default();

    let seven = Invoice::new(7);
    assert_eq!(seven.id, 7);
    assert!(engine.check(&user, &Target::Resource(&seven), READ, opts).unwrap());
    assert!(!engine.check(&user, &Target::Resource(&seven), WRITE, opts).unwrap());
    assert!(engine.check(&user, &Target::Field(&seven, "total"), WRITE, opts).unwrap());
    assert!(!engine.check(&user, &Target::Resource(&Invoice::new(13)), READ, opts).unwrap());
    assert!(engine.check(&user, &Target::Create(&InvoiceClass), WRITE, opts).unwrap());
    assert!(matches!(
        engine.check(&user, &Target::Create(&seven), WRITE, opts),
        Err(NspError::Usage(_))
    ));
}

#[test]
fn test_explicit_and_ambiguous_checks() {
    let id = PrincipalId::new_v4();
    let engine = engine_for(id);
    let user = Principal::user(id);

    let seven = Invoice::new(7);
    assert!(!engine.check(&user, &Target::Resource(&seven), READ, CheckOptions::explicit()).unwrap());
    assert!(engine.check(&user, &Target::from("billing.invoice"), READ, CheckOptions::explicit()).unwrap());

    // Nothing is granted on `billing` itself, but a grant lies below it.
    assert!(!engine.check(&user, &Target::from("billing"), READ, CheckOptions::default()).unwrap());
    assert!(engine.check(&user, &Target::from("billing"), READ, CheckOptions::ambiguous()).unwrap());
}

#[test]
fn test_filter_with_list_handler() {
    let id = PrincipalId::new_v4();
    let mut source = InMemoryGrantSource::new();
    source
        .grant_principal(id, "shop.items.*", READ)
        .grant_principal(id, "shop.items.*.cost", DENY)
        .grant_principal(id, "shop.items.2", DENY);
    let engine = Engine::new(NspConfig::default(), source);

    let rules = Ruleset::new().list_handler("shop.items", ListHandler::field("id")).unwrap();
    let out = engine.filter(&Principal::user(id), &item_list(4), Some(&rules)).unwrap();
    assert_eq!(
        out,
        json!({"shop": {"items": [
            {"id": 0, "name": "item 0"},
            {"id": 1, "name": "item 1"},
            {"id": 3, "name": "item 3"}
        ]}})
    );
}

#[test]
fn test_grant_changes_need_reload() {
    let id = PrincipalId::new_v4();
    let mut source = InMemoryGrantSource::new();
    source.grant_principal(id, "docs", READ);
    let engine = Engine::new(NspConfig::default(), source);
    let user = Principal::user(id);
    let before = engine.permissions(&user).unwrap();
    let again = engine.reload(&user).unwrap();
    assert_eq!(before.grants(), again.grants());
    assert!(!Arc::ptr_eq(&before, &again));
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let id = PrincipalId::new_v4();
    let engine = Arc::new(engine_for(id));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let target = format!("billing.invoice.{}", 100 + i);
                engine
                    .check(&Principal::user(id), &Target::from(target.as_str()), READ, CheckOptions::default())
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(engine.cache().len(), 1);
}
