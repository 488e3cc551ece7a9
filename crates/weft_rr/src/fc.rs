//! Conversion of architectural Fc specifications into track counts.

use crate::error::RrGraphError;
use weft_arch::{Architecture, FcSpec, PinClassKind};

/// Actual Fc per block type and pin for one pin kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualFc {
    /// `per_type[block_type][pin]`; 0 for pins of the other kind, global
    /// pins, and explicit Fc = 0.
    pub per_type: Vec<Vec<u32>>,
    /// Some pin asked for more tracks than the channel has.
    pub clipped: bool,
}

impl ActualFc {
    /// The largest Fc of any pin of `block_type`.
    pub fn max_for_type(&self, block_type: usize) -> u32 {
        self.per_type[block_type].iter().copied().max().unwrap_or(0)
    }
}

/// Computes actual Fc values for every pin of kind `kind`.
///
/// `sets` is the number of track sets in the channel and `fac` the tracks
/// per set (1 bidir, 2 unidir), so the channel holds `sets * fac` tracks.
/// Global-routing graphs have a single track and use Fc = 1 throughout.
pub fn actual_fc(
    arch: &Architecture,
    kind: PinClassKind,
    sets: u32,
    fac: u32,
    ignore_fc_0: bool,
    global_graph: bool,
) -> Result<ActualFc, RrGraphError> {
    let width = sets * fac;
    let mut clipped = false;
    let mut per_type = Vec::with_capacity(arch.block_types.len());
    for block in &arch.block_types {
        let mut pins = Vec::with_capacity(block.num_pins() as usize);
        for pin in 0..block.num_pins() {
            if block.pin_kind(pin) != kind || block.is_global_pin(pin) {
                pins.push(0);
                continue;
            }
            if global_graph {
                pins.push(1);
                continue;
            }
            let spec = block.fc_for_pin(pin);
            if spec.is_zero() && !ignore_fc_0 {
                pins.push(0);
                continue;
            }
            let mut fc = match spec {
                FcSpec::Frac(f) => fac * (sets as f32 * f).round() as u32,
                FcSpec::Abs(n) => {
                    if n % fac != 0 {
                        return Err(RrGraphError::InvalidOption(format!(
                            "Fc of {n} for pin {pin} of block type '{}' must be a multiple of {fac}",
                            block.name
                        )));
                    }
                    n
                }
                FcSpec::Full => width,
            };
            fc = fc.max(fac);
            if fc > width {
                fc = width;
                clipped = true;
            }
            pins.push(fc);
        }
        per_type.push(pins);
    }
    Ok(ActualFc { per_type, clipped })
}

/// Decides whether input pins use the perturbed pattern.
///
/// Perturbation avoids input and output pins landing on the same tracks
/// when one Fc is (nearly) a multiple of the other.
pub fn should_perturb_ipins(fc_in: u32, fc_out: u32, width: u32) -> bool {
    if fc_in == 0 || fc_out == 0 || width == 0 {
        return false;
    }
    let ratio = fc_in.max(fc_out) as f32 / fc_in.min(fc_out) as f32;
    (fc_in as i64) <= width as i64 - 2 && (ratio - ratio.round()).abs() < 0.5 / width as f32
}
