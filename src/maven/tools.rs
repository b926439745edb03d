//! 把 [`MavenService`] 的五个操作注册成 MCP 工具

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::envelope::ResultEnvelope;
use super::error::MavenError;
use super::operations::{
    MavenService, ALL_LATEST_VERSIONS_TOOL, BATCH_VERSIONS_TOOL, COMPONENT_VERSION_TOOL,
    LATEST_VERSION_TOOL, VERSION_EXISTS_TOOL,
};
use crate::server::{FunctionTool, MavenMCP, ToolAnnotations, ToolArguments};

/// 参数类型不对时直接返回 `INVALID_INPUT_FORMAT` 信封
fn decode_args<T: DeserializeOwned + Default>(
    tool_name: &str,
    args: ToolArguments,
) -> Result<T, ResultEnvelope> {
    let args = match args {
        Some(args) => args,
        None => return Ok(T::default()),
    };
    let object: Map<String, Value> = args.into_iter().collect();
    serde_json::from_value(Value::Object(object)).map_err(|e| {
        warn!("{} received malformed arguments: {}", tool_name, e);
        ResultEnvelope::error(
            tool_name,
            MavenError::invalid_input(format!("Invalid arguments: {}", e)),
        )
    })
}

fn string_property(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn packaging_property() -> Value {
    json!({
        "type": "string",
        "description": "Packaging type (jar, pom, war, ...). Defaults to pom for -bom/-dependencies artifacts, jar otherwise",
        "default": "jar"
    })
}

fn classifier_property() -> Value {
    string_property("Optional classifier such as sources or javadoc")
}

fn include_prerelease_property() -> Value {
    json!({
        "type": "boolean",
        "description": "Consider alpha/beta/RC/milestone/snapshot versions when selecting",
        "default": false
    })
}

fn dependency_property() -> Value {
    string_property("Maven coordinate in the form groupId:artifactId")
}

fn version_property() -> Value {
    string_property("Version currently in use, e.g. 3.12.0")
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// 注册全部工具
pub fn register_tools(mcp: &mut MavenMCP, service: Arc<MavenService>) -> Result<(), String> {
    let svc = service.clone();
    mcp.add_tool(FunctionTool::from_function(
        move |args| {
            let svc = svc.clone();
            async move {
                let envelope = match decode_args(LATEST_VERSION_TOOL, args) {
                    Ok(args) => svc.get_latest_version(args).await,
                    Err(envelope) => envelope,
                };
                Ok::<_, String>(envelope.to_value())
            }
        },
        LATEST_VERSION_TOOL,
        "Get the latest stable version of a Maven dependency from Maven Central",
        Some(object_schema(
            json!({
                "dependency": dependency_property(),
                "packaging": packaging_property(),
                "classifier": classifier_property(),
                "include_prerelease": include_prerelease_property()
            }),
            &["dependency"],
        )),
        Some(ToolAnnotations::read_only_lookup("Latest Maven version")),
    ))?;

    let svc = service.clone();
    mcp.add_tool(FunctionTool::from_function(
        move |args| {
            let svc = svc.clone();
            async move {
                let envelope = match decode_args(VERSION_EXISTS_TOOL, args) {
                    Ok(args) => svc.check_version_exists(args).await,
                    Err(envelope) => envelope,
                };
                Ok::<_, String>(envelope.to_value())
            }
        },
        VERSION_EXISTS_TOOL,
        "Check whether a specific version of a Maven dependency is published in Maven Central",
        Some(object_schema(
            json!({
                "dependency": dependency_property(),
                "version": string_property("Version to look for"),
                "packaging": packaging_property(),
                "classifier": classifier_property()
            }),
            &["dependency", "version"],
        )),
        Some(ToolAnnotations::read_only_lookup("Maven version exists")),
    ))?;

    let svc = service.clone();
    mcp.add_tool(FunctionTool::from_function(
        move |args| {
            let svc = svc.clone();
            async move {
                let envelope = match decode_args(COMPONENT_VERSION_TOOL, args) {
                    Ok(args) => svc.find_latest_component_version(args).await,
                    Err(envelope) => envelope,
                };
                Ok::<_, String>(envelope.to_value())
            }
        },
        COMPONENT_VERSION_TOOL,
        "Find the latest version of a Maven dependency for a major, minor or patch update of the given version",
        Some(object_schema(
            json!({
                "dependency": dependency_property(),
                "version": version_property(),
                "target_component": {
                    "type": "string",
                    "enum": ["major", "minor", "patch"],
                    "description": "Which version component may change"
                },
                "packaging": packaging_property(),
                "classifier": classifier_property(),
                "include_prerelease": include_prerelease_property()
            }),
            &["dependency", "version", "target_component"],
        )),
        Some(ToolAnnotations::read_only_lookup("Latest Maven component version")),
    ))?;

    let svc = service.clone();
    mcp.add_tool(FunctionTool::from_function(
        move |args| {
            let svc = svc.clone();
            async move {
                let envelope = match decode_args(ALL_LATEST_VERSIONS_TOOL, args) {
                    Ok(args) => svc.get_all_latest_versions(args).await,
                    Err(envelope) => envelope,
                };
                Ok::<_, String>(envelope.to_value())
            }
        },
        ALL_LATEST_VERSIONS_TOOL,
        "Get the latest major, minor and patch versions of a Maven dependency relative to the given version",
        Some(object_schema(
            json!({
                "dependency": dependency_property(),
                "version": version_property(),
                "packaging": packaging_property(),
                "classifier": classifier_property(),
                "include_prerelease": include_prerelease_property()
            }),
            &["dependency", "version"],
        )),
        Some(ToolAnnotations::read_only_lookup("All latest Maven versions")),
    ))?;

    let svc = service;
    mcp.add_tool(FunctionTool::from_function(
        move |args: ToolArguments| {
            let svc = svc.clone();
            async move {
                let dependencies = args.as_ref().and_then(|map| map.get("dependencies"));
                Ok::<_, String>(svc.batch_versions_check(dependencies).await.to_value())
            }
        },
        BATCH_VERSIONS_TOOL,
        "Check latest major, minor and patch versions for many Maven dependencies in one call",
        Some(object_schema(
            json!({
                "dependencies": {
                    "type": "array",
                    "description": "Dependencies to check, results keep this order",
                    "items": object_schema(
                        json!({
                            "dependency": dependency_property(),
                            "version": version_property(),
                            "packaging": packaging_property(),
                            "classifier": classifier_property()
                        }),
                        &["dependency", "version"],
                    )
                }
            }),
            &["dependencies"],
        )),
        Some(ToolAnnotations::read_only_lookup("Batch Maven version check")),
    ))?;

    Ok(())
}
