use futures::future::BoxFuture;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

/// 工具参数
pub type ToolArguments = Option<HashMap<String, Value>>;

/// 工具函数类型定义
pub type ToolFunction =
    Arc<dyn Fn(ToolArguments) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

/// 重复工具处理行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateBehavior {
    Warn,
    Error,
    Replace,
    Ignore,
}

/// 工具注解结构体
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ToolAnnotations {
    /// 工具的人类可读标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 工具是否为只读
    #[serde(rename = "readOnlyHint", skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    /// 工具是否具有破坏性
    #[serde(rename = "destructiveHint", skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    /// 工具是否幂等
    #[serde(rename = "idempotentHint", skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    /// 工具是否与开放世界交互
    #[serde(rename = "openWorldHint", skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

impl ToolAnnotations {
    /// 只读、幂等、访问外部服务的查询类工具
    pub fn read_only_lookup(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint: Some(true),
        }
    }
}

/// 函数式工具结构体
#[derive(Serialize, Clone)]
pub struct FunctionTool {
    /// 工具名称
    pub name: String,
    /// 工具的人类可读标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 工具描述
    pub description: String,
    /// 工具参数的JSON Schema
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// 工具注解
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,

    #[serde(skip)]
    function: ToolFunction,
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("annotations", &self.annotations)
            .finish()
    }
}

impl FunctionTool {
    /// 从异步函数创建工具
    ///
    /// # Arguments
    /// * `function` - 要包装的函数
    /// * `name` - 工具名称
    /// * `description` - 工具描述
    /// * `input_schema` - 输入模式
    /// * `annotations` - 注解
    pub fn from_function<F, Fut>(
        function: F,
        name: &str,
        description: &str,
        input_schema: Option<Value>,
        annotations: Option<ToolAnnotations>,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let function: ToolFunction = Arc::new(move |args| Box::pin(function(args)));
        Self {
            name: name.to_string(),
            title: annotations.as_ref().and_then(|a| a.title.clone()),
            description: description.to_string(),
            input_schema,
            annotations,
            function,
        }
    }

    /// 调用工具函数
    pub async fn call(&self, args: ToolArguments) -> Result<Value, String> {
        (self.function)(args).await
    }
}

/// 工具管理器，按名称有序保存
#[derive(Debug, Clone)]
pub struct ToolManager {
    tools: BTreeMap<String, FunctionTool>,
    duplicate_behavior: DuplicateBehavior,
}

impl ToolManager {
    /// 创建新的工具管理器
    pub fn new() -> Self {
        Self::with_behavior(DuplicateBehavior::Warn)
    }

    /// 创建具有指定重复行为的新工具管理器
    pub fn with_behavior(duplicate_behavior: DuplicateBehavior) -> Self {
        Self {
            tools: BTreeMap::new(),
            duplicate_behavior,
        }
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolManager {
    /// 添加工具
    pub fn add_tool(&mut self, tool: FunctionTool) -> Result<(), String> {
        if self.tools.contains_key(&tool.name) {
            match self.duplicate_behavior {
                DuplicateBehavior::Warn => {
                    warn!("Tool '{}' already exists, replacing", tool.name);
                    self.tools.insert(tool.name.clone(), tool);
                }
                DuplicateBehavior::Error => {
                    return Err(format!("Tool '{}' already exists", tool.name));
                }
                DuplicateBehavior::Replace => {
                    self.tools.insert(tool.name.clone(), tool);
                }
                DuplicateBehavior::Ignore => {}
            }
        } else {
            self.tools.insert(tool.name.clone(), tool);
        }
        Ok(())
    }

    /// 获取工具
    pub fn get_tool(&self, name: &str) -> Option<&FunctionTool> {
        self.tools.get(name)
    }

    /// 列出所有工具
    pub fn list_tools(&self) -> Vec<&FunctionTool> {
        self.tools.values().collect()
    }

    /// 调用工具
    pub async fn call_tool(&self, name: &str, args: ToolArguments) -> Result<Value, String> {
        match self.get_tool(name) {
            Some(tool) => tool.call(args).await,
            None => Err(format!("Tool '{}' not found", name)),
        }
    }
}
