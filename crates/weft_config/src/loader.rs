//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::WeftConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "weft.toml";

/// Loads and validates `<dir>/weft.toml`.
pub fn load_config(dir: &Path) -> Result<WeftConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration from an explicit path.
pub fn load_config_file(path: &Path) -> Result<WeftConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<WeftConfig, ConfigError> {
    let config: WeftConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks required tables and value ranges that serde cannot express.
fn validate_config(config: &WeftConfig) -> Result<(), ConfigError> {
    if config.switches.is_empty() {
        return Err(ConfigError::MissingField("switch".to_string()));
    }
    if config.segments.is_empty() {
        return Err(ConfigError::MissingField("segment".to_string()));
    }
    if config.block_types.is_empty() {
        return Err(ConfigError::MissingField("block_type".to_string()));
    }
    if config.routing.channel_width == 0 {
        return Err(ConfigError::ValidationError(
            "routing.channel_width must be positive".to_string(),
        ));
    }
    if config.routing.fs == 0 {
        return Err(ConfigError::ValidationError(
            "routing.fs must be positive".to_string(),
        ));
    }
    for seg in &config.segments {
        if seg.length == 0 && !seg.longline {
            return Err(ConfigError::ValidationError(format!(
                "segment '{}' has length 0",
                seg.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use weft_arch::{Directionality, FcSpec, GraphType, PinLocations, SwitchBlockType};

    pub(crate) const MINIMAL: &str = r#"
[routing]
channel_width = 4
delayless_switch = "delayless"
wire_to_ipin_switch = "delayless"

[[switch]]
name = "delayless"

[[segment]]
name = "l1"
directionality = "bidir"
wire_switch = "delayless"

[[block_type]]
name = "clb"
fc_in = { abs = 1 }
fc_out = { abs = 1 }

[[block_type.port]]
name = "I"
kind = "input"
num_pins = 1

[[block_type.port]]
name = "O"
kind = "output"
num_pins = 1

[grid]
nx = 2
ny = 2
fill = "clb"
"#;

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.routing.channel_width, 4);
        assert_eq!(config.routing.graph_type, GraphType::Bidir);
        assert_eq!(config.routing.switch_block_type, SwitchBlockType::Wilton);
        assert_eq!(config.routing.fs, 3);
        assert!(config.routing.check_pass_transistors);
        assert_eq!(config.segments[0].length, 1);
        assert_eq!(config.segments[0].directionality, Directionality::Bidir);
        assert_eq!(config.block_types[0].ports.len(), 2);
        assert_eq!(config.block_types[0].fc_in, FcSpec::Abs(1));
        assert_eq!(config.block_types[0].pin_locations, PinLocations::Spread);
        assert_eq!(config.grid.nx, 2);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[routing]
graph_type = "unidir"
channel_width = 20
switch_block_type = "subset"
fs = 3
ignore_fc_0 = true
check_pass_transistors = false
base_cost_type = "demand_only_normalized_length"
delayless_switch = "delayless"
wire_to_ipin_switch = "ipin"
global_route_switch = "delayless"

[[switch]]
name = "delayless"

[[switch]]
name = "mux0"
r = 551.0
cin = 0.77e-15
cout = 4e-15
tdel = 58e-12

[[switch]]
name = "ipin"
buffered = false
r = 100.0

[[segment]]
name = "l4"
length = 4
frequency = 3
directionality = "unidir"
wire_switch = "mux0"
r_metal = 101.0
c_metal = 22.5e-15
cb = [true, false, false, true]
sb = [true, true, false, true, true]

[[segment]]
name = "long"
longline = true
directionality = "unidir"
wire_switch = "mux0"
opin_switch = "delayless"

[[block_type]]
name = "io"
is_io = true
fc_in = { frac = 1.0 }
fc_out = "full"
pin_locations = "all_sides"

[[block_type.port]]
name = "outpad"
kind = "input"
num_pins = 1

[[block_type]]
name = "clb"
height = 2
fc_in = { frac = 0.15 }
fc_out = { frac = 0.25 }

[block_type.pin_locations]
custom = [
  { side = "left", offset = 0, pins = ["I"] },
  { side = "top", offset = 1, pins = ["cout"] },
]

[[block_type.port]]
name = "I"
kind = "input"
num_pins = 4
equivalent = true

[[block_type.port]]
name = "cout"
kind = "output"
num_pins = 1
fc = { abs = 0 }

[[direct]]
name = "carry"
from_pin = "clb.cout"
to_pin = "clb.I[0]"
y_offset = -2
switch = "mux0"

[grid]
nx = 4
ny = 4
io = "io"
fill = "clb"

[[grid.column]]
block_type = "clb"
start = 1
repeat = 2
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.routing.graph_type, GraphType::Unidir);
        assert!(config.routing.ignore_fc_0);
        assert!(!config.routing.check_pass_transistors);
        assert_eq!(config.switches.len(), 3);
        assert!(!config.switches[2].buffered);
        assert_eq!(config.segments[0].cb.as_ref().unwrap().len(), 4);
        assert!(config.segments[1].longline);
        assert_eq!(config.block_types[0].fc_out, FcSpec::Full);
        assert_eq!(config.block_types[1].height, 2);
        assert!(matches!(
            &config.block_types[1].pin_locations,
            PinLocations::Custom(locs) if locs.len() == 2
        ));
        assert_eq!(config.directs[0].y_offset, -2);
        assert_eq!(config.grid.columns.len(), 1);
    }

    #[test]
    fn missing_switches_errors() {
        let toml = MINIMAL.replace("[[switch]]\nname = \"delayless\"\n", "");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "switch"));
    }

    #[test]
    fn zero_channel_width_errors() {
        let toml = MINIMAL.replace("channel_width = 4", "channel_width = 0");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), MINIMAL).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.block_types[0].name, "clb");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
