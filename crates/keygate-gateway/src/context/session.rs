//! SessionBuilder.

use keygate_core::model::{GeoInfo, KeyRecord, SessionDescriptor};

/// Assemble the session snapshot for this request. Pure construction.
pub fn build_session(
    key: &KeyRecord,
    device: Option<&str>,
    geo: Option<&GeoInfo>,
    service: &str,
    api_path: &str,
) -> SessionDescriptor {
    let app = key.application.clone().unwrap_or_default();
    SessionDescriptor {
        tenant_id: key.tenant.id.clone(),
        tenant_key: key.key.clone(),
        ext_key: key.ext_key.clone(),
        product: app.product,
        package: app.package.unwrap_or_default(),
        app_id: app.app_id,
        service_name: service.to_string(),
        api_path: api_path.to_string(),
        device: device.map(str::to_string),
        geo: geo.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_carries_request_context() {
        let key: KeyRecord = serde_json::from_value(serde_json::json!({
            "key": "ik", "extKey": "ek",
            "tenant": { "id": "t1" },
            "application": { "product": "P", "package": "P_BASIC", "appId": "a1" }
        }))
        .unwrap();
        let geo = GeoInfo { ip: "10.0.0.1".parse().unwrap() };

        let s = build_session(&key, Some("curl/8.0"), Some(&geo), "orders", "/list");
        assert_eq!(s.tenant_id, "t1");
        assert_eq!(s.tenant_key, "ik");
        assert_eq!(s.ext_key, "ek");
        assert_eq!(s.package, "P_BASIC");
        assert_eq!(s.app_id, "a1");
        assert_eq!(s.service_name, "orders");
        assert_eq!(s.api_path, "/list");
        assert_eq!(s.device.as_deref(), Some("curl/8.0"));
        assert_eq!(s.geo, Some(geo));

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["tenantKey"], "ik");
        assert_eq!(json["serviceName"], "orders");
    }
}
