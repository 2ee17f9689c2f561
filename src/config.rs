//! Hardware configuration constants for the ESP32-S3 bridge

/// Bridge buffer sizing
pub mod bridge {
    /// Capacity of each directional byte buffer
    pub const BUFFER_CAPACITY: usize = 2560;

    /// Number of CDC-ACM <-> UART interface pairs
    pub const NUM_INTERFACES: usize = 1;
}

/// Default serial configuration (applied until the host negotiates)
pub mod serial {
    pub const BAUD_RATE: u32 = 115_200;
    pub const DATA_BITS: u8 = 8;
    /// CDC wire value: 0 = none
    pub const PARITY: u8 = 0;
    /// CDC wire value: 0 = one stop bit
    pub const STOP_BITS: u8 = 0;
}

/// UART pin pairs, one disjoint pair per operating mode that uses the UART
pub mod pins {
    /// Default (dual-purpose) mode
    pub mod default_mode {
        pub const UART_TX: u8 = 17;
        pub const UART_RX: u8 = 18;
    }

    /// Dedicated-UART mode
    pub mod uart_only {
        pub const UART_TX: u8 = 43;
        pub const UART_RX: u8 = 44;
    }

    /// Strap inputs sampled once at boot to select the operating mode
    pub mod mode_select {
        pub const BIT0: u8 = 1;
        pub const BIT1: u8 = 2;
    }
}
