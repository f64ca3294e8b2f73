#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use keygate_core::model::{AccessRule, ApisPermission, KeyRecord, OsRule, PackageRecord};

const KEY_JSON: &str = r#"
{
  "key": "i-key-1",
  "extKey": "e-key-1",
  "tenant": { "id": "t1", "code": "ACME" },
  "application": {
    "product": "ORDERS",
    "package": "ORDERS_BASIC",
    "appId": "app-1",
    "acl": {
      "orders": {
        "access": true,
        "apisPermission": "restricted",
        "apis": { "/list": {}, "/admin": { "access": ["admin"] } },
        "apisRegExp": [ { "regExp": "^/item/[0-9]+$", "access": false } ]
      }
    }
  },
  "config": { "orders": { "pageSize": 20 } },
  "geo": { "deny": ["10.0.0.0/8"] },
  "device": { "allow": [ { "family": "chrome", "os": "windows" } ] }
}
"#;

#[test]
fn key_record_from_provisioning_json() {
    let rec: KeyRecord = serde_json::from_str(KEY_JSON).expect("must parse");
    assert_eq!(rec.package_id(), Some("ORDERS_BASIC"));
    assert_eq!(rec.tenant.code.as_deref(), Some("ACME"));

    let app = rec.application.as_ref().unwrap();
    let orders = &app.acl.as_ref().unwrap()["orders"];
    assert_eq!(orders.base.access, Some(AccessRule::Flag(true)));
    assert_eq!(orders.base.apis_permission, Some(ApisPermission::Restricted));
    let apis = orders.base.apis.as_ref().unwrap();
    assert!(apis["/admin"].requires_access());
    assert!(!apis["/list"].requires_access());
    let rx = orders.base.apis_reg_exp.as_ref().unwrap();
    assert_eq!(rx[0].reg_exp, "^/item/[0-9]+$");
    assert!(!rx[0].entry.requires_access());

    let geo = rec.geo.as_ref().unwrap();
    assert_eq!(geo.deny.as_deref(), Some(&["10.0.0.0/8".to_string()][..]));
    assert!(geo.allow.is_none());

    let dev = rec.device.as_ref().unwrap();
    let rule = &dev.allow.as_ref().unwrap()[0];
    assert_eq!(rule.os, Some(OsRule::Family("windows".into())));
}

#[test]
fn key_without_linkage_has_no_package() {
    let rec: KeyRecord = serde_json::from_str(
        r#"{"key":"k","extKey":"e","tenant":{"id":"t"},"application":{"product":"P"}}"#,
    )
    .unwrap();
    assert_eq!(rec.package_id(), None);
    assert!(rec.config.is_null());
}

#[test]
fn package_record_keeps_all_env_acl() {
    let pack: PackageRecord = serde_json::from_str(
        r#"{"code":"BASIC","acl":{"orders":{"apis":{"/x":{}}}},"acl_all_env":{"dev":{"orders":{"apisPermission":"open"}}}}"#,
    )
    .unwrap();
    assert!(pack.acl.unwrap()["orders"].base.defines_apis());
    let all = pack.acl_all_env.unwrap();
    assert_eq!(all["dev"]["orders"].base.apis_permission, Some(ApisPermission::Open));
}
