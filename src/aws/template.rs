//! Typed resource declarations consumed by an external provisioning engine.
//!
//! Everything here is plain immutable data: declaring a topology constructs
//! these records once, and [Template::to_json]/[Template::to_yaml] render them
//! for the engine that performs the actual diffing and rollout. No type in
//! this module touches the network or the filesystem.

use serde::Serialize;
use std::collections::BTreeMap;

/// Whether a statement grants or denies its actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

/// An allow/deny rule pairing an action set with a resource scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

/// The execution identity a deployed function runs as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Role {
    /// Service principal allowed to assume the role.
    pub assumed_by: String,
    /// Provider-managed permission sets attached to the role.
    pub managed_policies: Vec<String>,
    /// Explicit permission statements attached to the role.
    pub statements: Vec<Statement>,
}

/// Instructions for producing the deployable artifact inside a build container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bundling {
    pub image: String,
    pub command: Vec<String>,
    pub user: String,
}

/// Where the function code comes from and how it is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Code {
    /// Source directory handed to the build container.
    pub source: String,
    pub bundling: Bundling,
}

/// The serverless compute resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Function {
    pub runtime: String,
    pub handler: String,
    pub code: Code,
    /// Logical id of the execution role bound to the function.
    pub role: String,
    /// Environment variables visible to the running function.
    pub environment: BTreeMap<String, String>,
    /// Execution time limit, in seconds.
    pub timeout_secs: u64,
    pub description: String,
}

/// A cross-service grant allowing a principal to invoke the function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Permission {
    /// Logical id of the function the grant applies to.
    pub function: String,
    pub principal: String,
    pub action: String,
    /// Identifier the invoking resource must match exactly.
    pub source_arn: String,
}

/// A single resource declaration, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resource {
    Role(Role),
    Function(Function),
    Permission(Permission),
}

/// Attribute of a declared resource only known after deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Name,
    Arn,
}

/// Value of a descriptive output: either known at declaration time or
/// deferred to an attribute the engine resolves after rollout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputValue {
    Literal(String),
    Attribute { resource: String, attribute: Attribute },
}

/// A key-value pair surfaced to the operator after deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Output {
    pub value: OutputValue,
    pub description: String,
}

/// The complete declaration graph for one deployment.
///
/// Resources and outputs are keyed by logical id in ordered maps, so
/// rendering the same template twice produces byte-identical documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Template {
    pub stack: String,
    pub account: String,
    pub region: String,
    pub resources: BTreeMap<String, Resource>,
    pub outputs: BTreeMap<String, Output>,
}

impl Template {
    /// Renders the template as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the template as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        let mut resources = BTreeMap::new();
        resources.insert(
            "Role".to_string(),
            Resource::Role(Role {
                assumed_by: "lambda.amazonaws.com".to_string(),
                managed_policies: vec![],
                statements: vec![Statement {
                    effect: Effect::Allow,
                    actions: vec!["sns:Publish".to_string()],
                    resources: vec!["arn:aws:sns:us-east-1:111:topic".to_string()],
                }],
            }),
        );
        let mut outputs = BTreeMap::new();
        outputs.insert(
            "RoleName".to_string(),
            Output {
                value: OutputValue::Attribute {
                    resource: "Role".to_string(),
                    attribute: Attribute::Name,
                },
                description: "Role name".to_string(),
            },
        );
        outputs.insert(
            "Note".to_string(),
            Output {
                value: OutputValue::Literal("declared".to_string()),
                description: "Static note".to_string(),
            },
        );
        Template {
            stack: "test".to_string(),
            account: "111".to_string(),
            region: "us-east-1".to_string(),
            resources,
            outputs,
        }
    }

    #[test]
    fn test_resource_kind_tag() {
        let rendered = serde_json::to_value(template()).unwrap();
        assert_eq!(rendered["resources"]["Role"]["kind"], "role");
        assert_eq!(
            rendered["resources"]["Role"]["assumed_by"],
            "lambda.amazonaws.com"
        );
        assert_eq!(
            rendered["resources"]["Role"]["statements"][0]["effect"],
            "allow"
        );
    }

    #[test]
    fn test_output_value_forms() {
        let rendered = serde_json::to_value(template()).unwrap();
        assert_eq!(rendered["outputs"]["Note"]["value"]["literal"], "declared");
        assert_eq!(
            rendered["outputs"]["RoleName"]["value"]["attribute"]["resource"],
            "Role"
        );
        assert_eq!(
            rendered["outputs"]["RoleName"]["value"]["attribute"]["attribute"],
            "name"
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let template = template();
        assert_eq!(template.to_json().unwrap(), template.to_json().unwrap());
        assert_eq!(template.to_yaml().unwrap(), template.to_yaml().unwrap());
    }
}
