//! GraphQL documents
//!
//! Operation names follow the control-plane schema convention
//! `<verb><Kind>Env`, e.g. `createAWSEnv`, `gcpEnvStatus`.

use crate::types::CloudKind;

/// An operation document plus the response field holding its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub field: String,
    pub document: String,
}

pub fn create_env(kind: CloudKind) -> Operation {
    mutation_with_input("create", kind, "specRevision")
}

pub fn update_env(kind: CloudKind) -> Operation {
    mutation_with_input("update", kind, "specRevision")
}

pub fn delete_env(kind: CloudKind) -> Operation {
    mutation_with_input("delete", kind, "pendingMFA")
}

pub fn get_env(kind: CloudKind) -> Operation {
    let name = format!("{}Env", kind.graphql_name());
    let field = format!("{}Env", kind.field_prefix());
    let document = format!(
        "query {name}($name: String!) {{ {field}(name: $name) {{ name specRevision spec }} }}"
    );
    Operation {
        name,
        field,
        document,
    }
}

pub fn get_env_status(kind: CloudKind) -> Operation {
    let name = format!("{}EnvStatus", kind.graphql_name());
    let field = format!("{}EnvStatus", kind.field_prefix());
    let document = format!(
        "query {name}($name: String!) {{ {field}(name: $name) {{ \
         appliedSpecRevision pendingDelete pendingMFA errors {{ code message }} }} }}"
    );
    Operation {
        name,
        field,
        document,
    }
}

pub fn encrypt_secret() -> Operation {
    Operation {
        name: "EncryptSecret".to_string(),
        field: "encryptSecret".to_string(),
        document: "mutation EncryptSecret($pem: String!, $value: String!) { \
                   encryptSecret(pem: $pem, value: $value) }"
            .to_string(),
    }
}

fn mutation_with_input(verb: &str, kind: CloudKind, selection: &str) -> Operation {
    let kind_name = kind.graphql_name();
    let field = format!("{verb}{kind_name}Env");
    let name = capitalize(&field);
    let document = format!(
        "mutation {name}($input: {name}Input!) {{ {field}(input: $input) {{ {selection} }} }}"
    );
    Operation {
        name,
        field,
        document,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
