//! Name resolution from a parsed [`WeftConfig`] to builder inputs.

use crate::error::ConfigError;
use crate::types::WeftConfig;
use weft_arch::{
    ArchError, ArchSwitch, Architecture, DirectDef, Grid, RoutingParams, SegmentDef, SwitchId,
};

/// Everything the graph builder needs, with names resolved to IDs.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The fabric description.
    pub arch: Architecture,
    /// The device grid.
    pub grid: Grid,
    /// Routing parameters.
    pub params: RoutingParams,
}

/// Resolves switch and block-type names and builds the grid.
pub fn resolve(config: &WeftConfig) -> Result<ResolvedConfig, ConfigError> {
    let mut arch = Architecture::new();
    for sw in &config.switches {
        arch.add_switch(ArchSwitch {
            name: sw.name.clone(),
            buffered: sw.buffered,
            r: sw.r,
            cin: sw.cin,
            cout: sw.cout,
            tdel: sw.tdel,
        })?;
    }
    let switch = |arch: &Architecture, name: &str| -> Result<SwitchId, ConfigError> {
        arch.switch_by_name(name)
            .ok_or_else(|| ArchError::UnknownSwitch(name.to_string()).into())
    };

    arch.delayless_switch = switch(&arch, &config.routing.delayless_switch)?;
    arch.wire_to_ipin_switch = switch(&arch, &config.routing.wire_to_ipin_switch)?;
    arch.global_route_switch = match &config.routing.global_route_switch {
        Some(name) => switch(&arch, name)?,
        None => arch.delayless_switch,
    };

    for seg in &config.segments {
        let wire_switch = switch(&arch, &seg.wire_switch)?;
        let opin_switch = match &seg.opin_switch {
            Some(name) => switch(&arch, name)?,
            None => wire_switch,
        };
        let span = seg.length.max(1) as usize;
        arch.add_segment(SegmentDef {
            name: seg.name.clone(),
            length: seg.length,
            frequency: seg.frequency,
            longline: seg.longline,
            directionality: seg.directionality,
            wire_switch,
            opin_switch,
            r_metal: seg.r_metal,
            c_metal: seg.c_metal,
            cb: seg.cb.clone().unwrap_or_else(|| vec![true; span]),
            sb: seg.sb.clone().unwrap_or_else(|| vec![true; span + 1]),
        })?;
    }

    for def in &config.block_types {
        arch.add_block_type(def.clone())?;
    }

    for direct in &config.directs {
        let sw = match &direct.switch {
            Some(name) => Some(switch(&arch, name)?),
            None => None,
        };
        arch.add_direct(DirectDef {
            name: direct.name.clone(),
            from_pin: direct.from_pin.clone(),
            to_pin: direct.to_pin.clone(),
            x_offset: direct.x_offset,
            y_offset: direct.y_offset,
            switch: sw,
        });
    }
    arch.validate()?;

    let grid = Grid::from_layout(&arch, &config.grid)?;
    let routing = &config.routing;
    let params = RoutingParams {
        graph_type: routing.graph_type,
        channel_width: routing.channel_width,
        switch_block_type: routing.switch_block_type,
        fs: routing.fs,
        ignore_fc_0: routing.ignore_fc_0,
        check_pass_transistors: routing.check_pass_transistors,
        base_cost_type: routing.base_cost_type,
    };
    Ok(ResolvedConfig { arch, grid, params })
}
