// Chope — I2S Audio Output
//
// Standard (Philips) I2S, 16-bit mono at the fixed output rate.  `write`
// blocks until the DMA queue accepts every sample.

use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_hal::i2s::config::{
    Config, DataBitWidth, SlotMode, StdClkConfig, StdConfig, StdGpioConfig, StdSlotConfig,
};
use esp_idf_hal::i2s::{I2s, I2sDriver, I2sTx};
use esp_idf_hal::peripheral::Peripheral;

use super::AudioOutput;
use crate::config::*;
use crate::error::AudioError;

pub struct I2sOutput {
    driver: I2sDriver<'static, I2sTx>,
    bytes: Vec<u8>,
}

impl I2sOutput {
    pub fn new(
        i2s: impl Peripheral<P = impl I2s> + 'static,
        bclk: impl Peripheral<P = impl InputPin + OutputPin> + 'static,
        dout: impl Peripheral<P = impl OutputPin> + 'static,
        ws: impl Peripheral<P = impl InputPin + OutputPin> + 'static,
    ) -> anyhow::Result<Self> {
        debug_assert_eq!(OUTPUT_BITS_PER_SAMPLE, 16);
        debug_assert_eq!(OUTPUT_CHANNELS, 1);

        let config = StdConfig::new(
            Config::default(),
            StdClkConfig::from_sample_rate_hz(OUTPUT_SAMPLE_RATE),
            StdSlotConfig::philips_slot_default(DataBitWidth::Bits16, SlotMode::Mono),
            StdGpioConfig::default(),
        );

        let mut driver =
            I2sDriver::new_std_tx(i2s, &config, bclk, dout, None::<AnyIOPin>, ws)?;
        driver.tx_enable()?;

        log::info!(
            "I2S output ready ({} Hz, {}-bit, {} ch, gain {})",
            OUTPUT_SAMPLE_RATE,
            OUTPUT_BITS_PER_SAMPLE,
            OUTPUT_CHANNELS,
            OUTPUT_GAIN
        );
        Ok(Self {
            driver,
            bytes: Vec::new(),
        })
    }
}

impl AudioOutput for I2sOutput {
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        self.bytes.clear();
        self.bytes
            .extend(samples.iter().flat_map(|s| s.to_le_bytes()));
        self.driver
            .write_all(&self.bytes, BLOCK)
            .map_err(|e| AudioError::Output(e.to_string()))
    }
}
