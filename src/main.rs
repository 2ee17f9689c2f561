#![no_std]
#![no_main]

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"), // version
    env!("CARGO_PKG_NAME"),    // project_name
    "00:00:00",                // build_time
    "2025-01-01",              // build_date
    "0.0.0",                   // idf_ver (not using IDF)
    0x10000,                   // mmu_page_size (64KB)
    0,                         // min_efuse_blk_rev_full (accept all)
    u16::MAX                   // max_efuse_blk_rev_full (accept all)
);

use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use esp_backtrace as _;
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::otg_fs::asynch::Driver;
use esp_hal::otg_fs::Usb;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::Uart;
use log::info;
use static_cell::StaticCell;

use usb_uart_bridge::mode::{OperatingMode, PinAssignment};
use usb_uart_bridge::tasks::{uart_bridge_task, usb_bridge_task, usb_device_task};
use usb_uart_bridge::uart;
use usb_uart_bridge::usb::CdcPort;

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

// USB driver and device buffers (needed for 'static lifetime)
static EP_OUT_BUFFER: StaticCell<[u8; 1024]> = StaticCell::new();
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 64]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();

#[esp_hal::main]
fn main() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::logger::init_logger_from_env();

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Sample the externally-driven mode straps once; the mode never changes
    // after boot
    let strap0 = Input::new(
        peripherals.GPIO1,
        InputConfig::default().with_pull(Pull::Down),
    );
    let strap1 = Input::new(
        peripherals.GPIO2,
        InputConfig::default().with_pull(Pull::Down),
    );
    let mode = OperatingMode::from_straps(strap0.is_high(), strap1.is_high());
    info!("operating mode: {:?}", mode);

    // UART pin pairs per mode; the GPIO numbers here mirror config::pins
    // (peripheral handles cannot be picked by integer). Uart::with_rx
    // initializes the pin as an input with the internal pull-up enabled, so
    // a disconnected RX line idles high rather than floating. In probe-only
    // mode the UART stays disabled entirely.
    match PinAssignment::for_mode(mode) {
        Some(pins) => {
            info!("uart pins: tx={} rx={}", pins.tx, pins.rx);
            let hw = match mode {
                OperatingMode::UartOnly => Uart::new(peripherals.UART1, uart::default_config())
                    .unwrap()
                    .with_tx(peripherals.GPIO43)
                    .with_rx(peripherals.GPIO44),
                _ => Uart::new(peripherals.UART1, uart::default_config())
                    .unwrap()
                    .with_tx(peripherals.GPIO17)
                    .with_rx(peripherals.GPIO18),
            };
            uart::install(0, hw);
        }
        None => info!("uart disabled in {:?} mode", mode),
    }

    // USB OTG CDC-ACM endpoint
    let usb = Usb::new(peripherals.USB0, peripherals.GPIO20, peripherals.GPIO19);
    let ep_out_buffer = EP_OUT_BUFFER.init([0u8; 1024]);
    let driver = Driver::new(usb, ep_out_buffer, esp_hal::otg_fs::asynch::Config::default());

    let mut usb_config = embassy_usb::Config::new(0x303A, 0x4001);
    usb_config.manufacturer = Some("usb-uart-bridge");
    usb_config.product = Some("USB-UART bridge");
    usb_config.max_packet_size_0 = 64;

    let mut builder = embassy_usb::Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 64]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );

    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), 64);
    let device = builder.build();
    let (tx, rx) = class.split();
    let port = CdcPort::new(tx, rx);

    // Create and run the embassy executor
    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(usb_device_task(device));
        if mode.bridge_active() {
            spawner.must_spawn(usb_bridge_task(port));
            spawner.must_spawn(uart_bridge_task());
        }
    })
}
