use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected 'STAGE.PARAM=VALUE' (e.g., 'run_neb.fmax=0.03').")]
    MissingEquals(String),

    #[error("Invalid --set key '{0}'. Expected 'STAGE.PARAM' (e.g., 'run_neb.fmax').")]
    MissingStage(String),

    #[error("Component '{component}' cannot be empty in '{text}'.")]
    EmptyComponent {
        component: &'static str,
        text: String,
    },
}

/// A single `--set STAGE.PARAM=VALUE` assignment, value still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValue {
    pub stage: String,
    pub param: String,
    pub value: String,
}

pub fn parse_set_value(text: &str) -> Result<SetValue, ParseError> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| ParseError::MissingEquals(text.to_string()))?;
    let (stage, param) = key
        .trim()
        .split_once('.')
        .ok_or_else(|| ParseError::MissingStage(key.to_string()))?;

    let empty = |component| ParseError::EmptyComponent {
        component,
        text: text.to_string(),
    };
    if stage.is_empty() {
        return Err(empty("stage"));
    }
    if param.is_empty() {
        return Err(empty("param"));
    }

    Ok(SetValue {
        stage: stage.to_string(),
        param: param.to_string(),
        value: value.to_string(),
    })
}
