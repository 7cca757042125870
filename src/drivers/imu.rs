// Chope — BNO055 IMU Driver
//
// Register-level driver over I2C.  The BNO055 runs its own sensor fusion
// (NDOF mode); we only read back the Euler angles.

use std::thread;
use std::time::Duration;

use esp_idf_hal::i2c::I2cDriver;

use super::OrientationSource;
use crate::config::*;
use crate::events::Orientation;

// BNO055 register addresses (page 0)
const REG_CHIP_ID: u8 = 0x00;
const REG_PAGE_ID: u8 = 0x07;
const REG_EUL_HEADING_LSB: u8 = 0x1A; // Heading, roll, pitch: 6 bytes LE
const REG_OPR_MODE: u8 = 0x3D;
const REG_PWR_MODE: u8 = 0x3E;
const REG_SYS_TRIGGER: u8 = 0x3F;
const CHIP_ID_EXPECTED: u8 = 0xA0;

const OPR_MODE_CONFIG: u8 = 0x00;
const OPR_MODE_NDOF: u8 = 0x0C;
const PWR_MODE_NORMAL: u8 = 0x00;
const SYS_TRIGGER_EXT_CRYSTAL: u8 = 0x80;

const EULER_LSB_PER_DEG: f32 = 16.0;

pub struct Bno055 {
    bus: I2cDriver<'static>,
}

impl Bno055 {
    pub fn new(bus: I2cDriver<'static>) -> Self {
        Self { bus }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match self
            .bus
            .write_read(I2C_ADDR_BNO055, &[REG_CHIP_ID], &mut buf, I2C_TIMEOUT_TICKS)
        {
            Ok(()) => buf[0] == CHIP_ID_EXPECTED,
            Err(_) => false,
        }
    }

    /// Normal power, external crystal, NDOF fusion.
    pub fn init(&mut self) -> anyhow::Result<()> {
        self.write_reg(REG_OPR_MODE, OPR_MODE_CONFIG)?;
        thread::sleep(Duration::from_millis(IMU_MODE_SWITCH_MS));

        self.write_reg(REG_PWR_MODE, PWR_MODE_NORMAL)?;
        self.write_reg(REG_PAGE_ID, 0)?;
        self.write_reg(REG_SYS_TRIGGER, SYS_TRIGGER_EXT_CRYSTAL)?;
        thread::sleep(Duration::from_millis(10));

        self.write_reg(REG_OPR_MODE, OPR_MODE_NDOF)?;
        thread::sleep(Duration::from_millis(IMU_MODE_SWITCH_MS));

        log::info!("BNO055 initialised (NDOF, external crystal)");
        Ok(())
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> anyhow::Result<()> {
        self.bus
            .write(I2C_ADDR_BNO055, &[reg, value], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}

impl OrientationSource for Bno055 {
    fn read_orientation(&mut self) -> anyhow::Result<Orientation> {
        let mut raw = [0u8; 6];
        self.bus.write_read(
            I2C_ADDR_BNO055,
            &[REG_EUL_HEADING_LSB],
            &mut raw,
            I2C_TIMEOUT_TICKS,
        )?;

        let angle = |lo: u8, hi: u8| i16::from_le_bytes([lo, hi]) as f32 / EULER_LSB_PER_DEG;
        Ok(Orientation {
            heading: angle(raw[0], raw[1]),
            roll: angle(raw[2], raw[3]),
            pitch: angle(raw[4], raw[5]),
        })
    }
}
