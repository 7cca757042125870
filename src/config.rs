// Chope — Hardware & System Configuration
// Target: ESP32-S3 + BNO055 IMU + I2S amplifier (MAX98357A)
//
// Everything here is fixed at build time.  Network credentials can be
// overridden through environment variables when the firmware is compiled
// (e.g. `CHOPE_WIFI_SSID=... cargo build --release`).

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_I2S_BCLK: i32 = 5;    // Bit clock
pub const PIN_I2S_LRC: i32 = 6;     // Word select / left-right clock
pub const PIN_I2S_DOUT: i32 = 7;    // Data out (to amplifier)
pub const PIN_I2C_SDA: i32 = 8;     // I2C data line
pub const PIN_I2C_SCL: i32 = 9;     // I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_BNO055: u8 = 0x28;
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SAMPLE_INTERVAL_MS: u64 = 100;          // 10 Hz motion sampling
pub const TICK_YIELD_MS: u64 = 1;                 // Let the idle task feed the watchdog
pub const BOOT_SETTLE_MS: u64 = 1000;             // Serial + board stabilisation
pub const IMU_MODE_SWITCH_MS: u64 = 30;           // BNO055 needs ≥ 19 ms between modes
pub const WS_RECONNECT_INTERVAL_MS: u64 = 5000;
pub const WS_SEND_TIMEOUT_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Motion detection
// ---------------------------------------------------------------------------
pub const MOTION_THRESHOLD_DEG: f32 = 5.0;        // Either axis, inclusive

// ---------------------------------------------------------------------------
// Audio output
// ---------------------------------------------------------------------------
pub const DECODE_BUFFER_SIZE: usize = 8192;       // Read-ahead between flash and decoder
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;
pub const OUTPUT_CHANNELS: u16 = 1;
pub const OUTPUT_BITS_PER_SAMPLE: u16 = 16;
pub const OUTPUT_GAIN: f32 = 0.4;

// ---------------------------------------------------------------------------
// Stored clips (paths relative to the storage mount point)
// ---------------------------------------------------------------------------
pub const SPIFFS_MOUNT: &str = "/spiffs";
pub const SPIFFS_MAX_FILES: usize = 5;
pub const ALERT_CLIP: &str = "/alert.mp3";
pub const ROAST_CLIP_COUNT: usize = 4;
pub const ROAST_CLIPS: [&str; ROAST_CLIP_COUNT] = [
    "/roast1.mp3",
    "/roast2.mp3",
    "/roast3.mp3",
    "/roast4.mp3",
];
pub const LOOP_CLIP: &str = ALERT_CLIP;
pub const AUTOLOOP_ON_BOOT: bool = false;

// ---------------------------------------------------------------------------
// Control channel
// ---------------------------------------------------------------------------
pub const MAX_FRAME_LEN: usize = 256;             // Outbound JSON frame bound (bytes)

// ---------------------------------------------------------------------------
// Network (build-time overridable)
// ---------------------------------------------------------------------------
pub const WIFI_SSID: &str = match option_env!("CHOPE_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "chope",
};
pub const WIFI_PASS: &str = match option_env!("CHOPE_WIFI_PASS") {
    Some(pass) => pass,
    None => "",
};
pub const SERVER_HOST: &str = match option_env!("CHOPE_SERVER_HOST") {
    Some(host) => host,
    None => "192.168.4.2",
};
pub const SERVER_PORT: u16 = 3001;
