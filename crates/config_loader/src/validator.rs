//! 配置校验模块
//!
//! 校验规则：
//! - logger 名称不含空段 (如 `a..b`、`.a`、`a.`)
//! - sink / formatter 名称非空
//! - formatter 模板非空
//! - 文件 sink 的 destination 非空字符串
//!
//! 引用关系 (sink/formatter 是否声明) 由 `DispatchRegistry::configure` 校验。

use contracts::{ContractError, DispatchSpec, SinkKind, ROOT_LOGGER};

/// 校验 DispatchSpec 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(spec: &DispatchSpec) -> Result<(), ContractError> {
    validate_logger_names(spec)?;
    validate_formatters(spec)?;
    validate_sinks(spec)?;
    spec.root_logger()?;
    Ok(())
}

/// 校验 logger 名称格式
fn validate_logger_names(spec: &DispatchSpec) -> Result<(), ContractError> {
    for name in spec.loggers.keys() {
        if name == ROOT_LOGGER {
            continue;
        }
        if name.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(ContractError::config_validation(
                format!("loggers[{name:?}]"),
                "logger name contains an empty segment",
            ));
        }
    }
    Ok(())
}

/// 校验 formatter 配置
fn validate_formatters(spec: &DispatchSpec) -> Result<(), ContractError> {
    for (name, formatter) in &spec.formatters {
        if name.is_empty() {
            return Err(ContractError::config_validation(
                "formatters",
                "formatter name cannot be empty",
            ));
        }
        if formatter.format.is_empty() {
            return Err(ContractError::config_validation(
                format!("formatters[{name}].format"),
                "format template cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(spec: &DispatchSpec) -> Result<(), ContractError> {
    for (name, sink) in &spec.sinks {
        if name.is_empty() {
            return Err(ContractError::config_validation(
                "sinks",
                "sink name cannot be empty",
            ));
        }
        if sink.kind == SinkKind::File
            && sink.destination.as_deref().is_some_and(|d| d.trim().is_empty())
        {
            return Err(ContractError::config_validation(
                format!("sinks[{name}].destination"),
                "file destination cannot be empty",
            ));
        }
    }
    Ok(())
}
