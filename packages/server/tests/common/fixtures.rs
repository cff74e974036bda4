//! Request fixtures shared by the integration tests.

#![allow(dead_code)]

use ministry_core::domains::provisioning::UserCreationRequest;
use uuid::Uuid;

/// A valid create-user request for `email` with no additional churches
pub fn creation_request(email: &str) -> UserCreationRequest {
    UserCreationRequest {
        email: email.to_string(),
        password: "s3nha-forte".to_string(),
        full_name: "Maria da Silva".to_string(),
        phone: Some("+55 11 98765-4321".to_string()),
        cpf: Some(unique_cpf()),
        church_id: Uuid::new_v4(),
        region_id: Some(Uuid::new_v4()),
        area_id: None,
        additional_churches: Vec::new(),
        user_id: None,
    }
}

/// Eleven digits, unique enough for one test run
pub fn unique_cpf() -> String {
    let digits = Uuid::new_v4().as_u128() % 100_000_000_000;
    format!("{:011}", digits)
}

/// JSON body for `POST /create-user`
pub fn creation_body(email: &str, church_id: Uuid) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": "s3nha-forte",
        "full_name": "João Pereira",
        "phone": "",
        "cpf": "",
        "church_id": church_id,
    })
}
