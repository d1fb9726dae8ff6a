//! State serialization for the client bootstrap.
//!
//! A codec turns a mapping into a JavaScript snippet that rebuilds it in the
//! browser, and prepares/finalizes values carried inside a JSON payload.

use serde_json::{Map, Value};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Global variable the value is assigned to.
    pub var: &'static str,
    /// Merge into an existing value of `var` instead of replacing it.
    pub additive: bool,
}

pub const STATE_SERIALIZATION: SerializeOptions = SerializeOptions {
    var: "$markoWidgetsState",
    additive: true,
};

pub const CONFIG_SERIALIZATION: SerializeOptions = SerializeOptions {
    var: "$markoWidgetsConfig",
    additive: true,
};

pub trait StateCodec {
    /// Code that assigns `value` to `options.var` when evaluated in the browser.
    fn serialize(&self, value: &Map<String, Value>, options: &SerializeOptions) -> Result<String>;

    /// A value that survives a JSON round trip; reversed by [`StateCodec::finalize`].
    fn stringify_prepare(&self, value: &Map<String, Value>) -> Result<Value>;

    fn finalize(&self, prepared: Value) -> Result<Value>;
}

/// Plain JSON codec, safe to embed inside a `<script>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    fn to_script_json(value: &Map<String, Value>) -> Result<String> {
        let json = serde_json::to_string(value)?;
        Ok(json
            .replace('<', "\\u003C")
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029"))
    }
}

impl StateCodec for JsonCodec {
    fn serialize(&self, value: &Map<String, Value>, options: &SerializeOptions) -> Result<String> {
        let json = Self::to_script_json(value)?;
        if options.additive {
            Ok(format!(
                "(function(t,s){{for(var k in s)t[k]=s[k]}})(window.{var}||(window.{var}={{}}),{json})",
                var = options.var,
                json = json
            ))
        } else {
            Ok(format!("window.{}={}", options.var, json))
        }
    }

    fn stringify_prepare(&self, value: &Map<String, Value>) -> Result<Value> {
        Ok(Value::Object(value.clone()))
    }

    fn finalize(&self, prepared: Value) -> Result<Value> {
        Ok(prepared)
    }
}
