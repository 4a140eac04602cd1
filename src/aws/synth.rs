//! `synth` subcommand

use crate::aws::{
    alarm_arn,
    template::{
        Attribute, Bundling, Code, Effect, Function, Output, OutputValue, Permission, Resource,
        Role, Statement, Template,
    },
    Config, Environment, Error, ALARM_ARN_OUTPUT, ALARM_CONFIRMATION, ALARM_PERMISSION_OUTPUT,
    ALARM_SERVICE_PRINCIPAL, BASIC_EXECUTION_POLICY, BUILD_COMMAND, BUILD_IMAGE, BUILD_USER,
    FUNCTION_ARN_OUTPUT, FUNCTION_DESCRIPTION, FUNCTION_HANDLER, FUNCTION_ID,
    FUNCTION_NAME_OUTPUT, FUNCTION_RUNTIME, FUNCTION_SOURCE, FUNCTION_TIMEOUT_SECS,
    INSTANCE_ID_VAR, INVOKE_ACTION, LAMBDA_SERVICE_PRINCIPAL, PERMISSION_ID, PUBLISH_ACTION,
    REBOOT_ACTION, ROLE_ID, SNS_TOPIC_ARN_VAR, STACK_NAME,
};
use std::{collections::BTreeMap, path::Path};
use tracing::{info, warn};

/// Serialization format of the emitted template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

/// Declares the complete resource graph for one deployment.
///
/// Pure: the same configuration and environment always produce a
/// byte-identical template. Empty configuration values are flagged but still
/// propagated into the declaration; the provisioning engine's own validation
/// is the authority on whether the result is deployable.
pub fn declare(config: &Config, environment: &Environment) -> Template {
    if config.instance_id.is_empty() {
        warn!("configuration has no instanceId; reboot target is undefined at runtime");
    }
    if config.sns_topic_arn.is_empty() {
        warn!("configuration has no snsTopicArn; publish grant has an empty resource scope");
    }

    let role = Role {
        assumed_by: LAMBDA_SERVICE_PRINCIPAL.to_string(),
        managed_policies: vec![BASIC_EXECUTION_POLICY.to_string()],
        statements: vec![
            Statement {
                effect: Effect::Allow,
                actions: vec![REBOOT_ACTION.to_string()],
                // Wildcard scope: the grant covers any instance, not just the
                // configured one.
                resources: vec!["*".to_string()],
            },
            Statement {
                effect: Effect::Allow,
                actions: vec![PUBLISH_ACTION.to_string()],
                resources: vec![config.sns_topic_arn.clone()],
            },
        ],
    };

    let mut variables = BTreeMap::new();
    variables.insert(INSTANCE_ID_VAR.to_string(), config.instance_id.clone());
    variables.insert(SNS_TOPIC_ARN_VAR.to_string(), config.sns_topic_arn.clone());
    let function = Function {
        runtime: FUNCTION_RUNTIME.to_string(),
        handler: FUNCTION_HANDLER.to_string(),
        code: Code {
            source: FUNCTION_SOURCE.to_string(),
            bundling: Bundling {
                image: BUILD_IMAGE.to_string(),
                command: vec![
                    "bash".to_string(),
                    "-c".to_string(),
                    BUILD_COMMAND.to_string(),
                ],
                user: BUILD_USER.to_string(),
            },
        },
        role: ROLE_ID.to_string(),
        environment: variables,
        timeout_secs: FUNCTION_TIMEOUT_SECS,
        description: FUNCTION_DESCRIPTION.to_string(),
    };

    let mut resources = BTreeMap::new();
    resources.insert(ROLE_ID.to_string(), Resource::Role(role));
    resources.insert(FUNCTION_ID.to_string(), Resource::Function(function));

    let mut outputs = BTreeMap::new();
    outputs.insert(
        FUNCTION_NAME_OUTPUT.to_string(),
        Output {
            value: OutputValue::Attribute {
                resource: FUNCTION_ID.to_string(),
                attribute: Attribute::Name,
            },
            description: "Lambda function name for EC2 reboot".to_string(),
        },
    );
    outputs.insert(
        FUNCTION_ARN_OUTPUT.to_string(),
        Output {
            value: OutputValue::Attribute {
                resource: FUNCTION_ID.to_string(),
                attribute: Attribute::Arn,
            },
            description: "Lambda function ARN".to_string(),
        },
    );

    // Presence of the alarm name toggles the invoke grant.
    if let Some(alarm_name) = &config.cloudwatch_alarm_name {
        if alarm_name.is_empty() {
            warn!("configuration has an empty cloudwatchAlarmName; grant will not match any alarm");
        }
        let source_arn = alarm_arn(&environment.region, &environment.account, alarm_name);
        resources.insert(
            PERMISSION_ID.to_string(),
            Resource::Permission(Permission {
                function: FUNCTION_ID.to_string(),
                principal: ALARM_SERVICE_PRINCIPAL.to_string(),
                action: INVOKE_ACTION.to_string(),
                source_arn: source_arn.clone(),
            }),
        );
        outputs.insert(
            ALARM_ARN_OUTPUT.to_string(),
            Output {
                value: OutputValue::Literal(source_arn),
                description: "CloudWatch alarm allowed to invoke the function".to_string(),
            },
        );
        outputs.insert(
            ALARM_PERMISSION_OUTPUT.to_string(),
            Output {
                value: OutputValue::Literal(ALARM_CONFIRMATION.to_string()),
                description: "Confirmation that the alarm invoke permission is declared"
                    .to_string(),
            },
        );
    }

    Template {
        stack: STACK_NAME.to_string(),
        account: environment.account.clone(),
        region: environment.region.clone(),
        resources,
        outputs,
    }
}

/// Loads the configuration, declares the topology, and writes the rendered
/// template to `output` (or stdout).
pub async fn synth(config_path: &Path, output: Option<&Path>, format: Format) -> Result<(), Error> {
    let config = Config::load(config_path)?;
    info!(path = ?config_path, "loaded configuration");

    let environment = Environment::resolve().await?;
    info!(
        account = environment.account.as_str(),
        region = environment.region.as_str(),
        "resolved deployment environment"
    );

    let template = declare(&config, &environment);
    let rendered = match format {
        Format::Json => template.to_json()?,
        Format::Yaml => template.to_yaml()?,
    };
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            info!(path = ?path, "wrote declaration template");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
