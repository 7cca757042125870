// Chope — Firmware Entry Point
//
// Boot sequence:
//   1. Mount SPIFFS and list the stored clips (fatal if the mount fails).
//   2. Bring up I2S audio output and the MP3 decoder.
//   3. Probe and configure the BNO055 IMU.
//   4. Associate with Wi-Fi, then open the WebSocket to the server.
//   5. Run the cooperative scheduler tick forever.
//
// All run-time state lives in the `Scheduler`; nothing after boot blocks
// except the I2S write inside the decode pump.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::thread;
    use std::time::{Duration, Instant};

    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use chope::config::*;
    use chope::drivers::i2s::I2sOutput;
    use chope::drivers::imu::Bno055;
    use chope::drivers::mp3::Mp3Decoder;
    use chope::drivers::storage::FsStorage;
    use chope::drivers::ws::WsTransport;
    use chope::drivers::{spiffs, wifi};
    use chope::{AudioModeController, ControlChannel, MotionSampler, Scheduler};

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    thread::sleep(Duration::from_millis(BOOT_SETTLE_MS));
    log::info!("=== Chope Sensor + Audio ===");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ---- 1. Storage -------------------------------------------------------
    if let Err(e) = spiffs::mount() {
        log::error!("SPIFFS mount failed: {}", e);
        return Err(e);
    }
    let storage = FsStorage::new(SPIFFS_MOUNT);
    if let Err(e) = storage.list() {
        log::warn!("Cannot list {}: {}", storage.root().display(), e);
    }

    // ---- 2. Audio ---------------------------------------------------------
    let output = I2sOutput::new(
        peripherals.i2s0,
        peripherals.pins.gpio5, // BCLK
        peripherals.pins.gpio7, // DOUT
        peripherals.pins.gpio6, // LRC
    )?;
    log::info!(
        "I2S ready: BCLK -> GPIO {}, LRC -> GPIO {}, DOUT -> GPIO {}",
        PIN_I2S_BCLK,
        PIN_I2S_LRC,
        PIN_I2S_DOUT
    );
    let decoder = Mp3Decoder::new(output);

    // ---- 3. IMU -----------------------------------------------------------
    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8, // SDA
        peripherals.pins.gpio9, // SCL
        &i2c_config,
    )?;
    let mut imu = Bno055::new(i2c);
    if imu.is_connected() {
        if let Err(e) = imu.init() {
            log::error!("BNO055 init failed: {}", e);
        }
    } else {
        // Continue anyway so the link and audio can still be debugged.
        log::error!(
            "BNO055 not detected! Check wiring: SDA -> GPIO {}, SCL -> GPIO {}",
            PIN_I2C_SDA,
            PIN_I2C_SCL
        );
    }

    // ---- 4. Network -------------------------------------------------------
    let _wifi = wifi::connect(peripherals.modem, sysloop, nvs)?;
    let uri = format!("ws://{}:{}/", SERVER_HOST, SERVER_PORT);
    let link = WsTransport::connect(&uri)?;

    // ---- 5. Scheduler -----------------------------------------------------
    let mut scheduler = Scheduler::new(
        MotionSampler::new(imu),
        AudioModeController::new(storage, decoder),
        ControlChannel::new(link),
    );
    if AUTOLOOP_ON_BOOT {
        scheduler.audio_mut().request_loop();
    }
    log::info!("Boot complete, entering main loop");

    let yield_for = Duration::from_millis(TICK_YIELD_MS);
    loop {
        scheduler.tick(Instant::now());
        thread::sleep(yield_for);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("the chope firmware only runs on ESP-IDF targets; use `cargo test` on the host")
}
