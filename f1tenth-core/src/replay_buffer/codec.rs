//! Lossless compression of states.
use crate::{error::F1tenthError, State};
use anyhow::Result;
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use ndarray::{ArrayD, IxDyn};
use std::io::{Read, Write};

/// A gzip compressed state with its uncompressed shape.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedState {
    shape: Vec<usize>,
    payload: Vec<u8>,
}

impl PackedState {
    /// Shape of the uncompressed state.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of bytes of the compressed payload.
    pub fn n_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// Compresses a state.
///
/// Values are serialized in logical (row-major) order, so that
/// [`decode`] restores the state bit for bit regardless of its memory layout.
pub fn encode(state: &State) -> Result<PackedState> {
    let values = state.iter().copied().collect::<Vec<f32>>();
    let bytes = bincode::serialize(&values).map_err(|e| F1tenthError::Codec(e.to_string()))?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&bytes)?;
    let payload = encoder.finish()?;

    Ok(PackedState {
        shape: state.shape().to_vec(),
        payload,
    })
}

/// Restores a state compressed with [`encode`].
pub fn decode(packed: &PackedState) -> Result<State> {
    let mut decoder = GzDecoder::new(&packed.payload[..]);
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    let values: Vec<f32> =
        bincode::deserialize(&bytes).map_err(|e| F1tenthError::Codec(e.to_string()))?;
    let state = ArrayD::from_shape_vec(IxDyn(&packed.shape), values)
        .map_err(|e| F1tenthError::Codec(e.to_string()))?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_codec_is_lossless() -> Result<()> {
        let state = Array2::from_shape_fn((64, 4), |(i, j)| {
            (i as f32 * 0.37).sin() * 1e-3 + j as f32 + f32::EPSILON
        })
        .into_dyn();
        let packed = encode(&state)?;
        assert_eq!(packed.shape(), &[64, 4]);

        let decoded = decode(&packed)?;
        assert_eq!(decoded.shape(), state.shape());
        for (a, b) in state.iter().zip(decoded.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        Ok(())
    }

    #[test]
    fn test_codec_non_standard_layout() -> Result<()> {
        let state = Array2::from_shape_fn((3, 5), |(i, j)| (i * 5 + j) as f32)
            .reversed_axes()
            .into_dyn();
        let decoded = decode(&encode(&state)?)?;
        assert_eq!(decoded, state);
        Ok(())
    }

    #[test]
    fn test_codec_compresses_constant_scans() -> Result<()> {
        let state = ArrayD::from_elem(IxDyn(&[1080, 2]), 10.0f32);
        let packed = encode(&state)?;
        assert!(packed.n_bytes() < 1080 * 2 * 4 / 10);
        Ok(())
    }
}
