//! Shared SPI bus transport
//!
//! The panel sits on an SPI bus that other peripherals may share, possibly
//! from interrupt context. Sharing is done by `embedded-hal-bus`: the bus lives
//! in an [`AtomicCell`] and every device gets an [`AtomicDevice`], which frames
//! each transaction with its chip-select pin and flushes before releasing CS.
//!
//! An [`AtomicDevice`] fails with [`AtomicError::Busy`] instead of blocking when
//! the bus is already in use. [`SharedSpiDevice`] retries such transactions a
//! bounded number of times, waiting between attempts so an interrupted holder
//! can finish, and then gives up with [`TransportError::BusUnavailable`].
//!
//! The bus itself must be set up by the HAL with [`SPI_MODE`] and
//! [`SPI_FREQUENCY_HZ`]; embedded-hal buses are configured when they are built.
//!
//! If nothing else uses the bus, an `embedded_hal_bus::spi::ExclusiveDevice`
//! can be handed to [`Interface`](crate::interface::Interface) directly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use epd2in13b_v4::bus::{AtomicCell, SharedSpiDevice};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::SpiBus;
//! # struct MockBus;
//! # impl embedded_hal::spi::ErrorType for MockBus { type Error = embedded_hal::spi::ErrorKind; }
//! # impl SpiBus for MockBus {
//! #     fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! let bus = AtomicCell::new(MockBus);
//! let epd_spi = match SharedSpiDevice::on_bus(&bus, MockPin, MockDelay, MockDelay) {
//!     Ok(device) => device.with_lock_attempts(10),
//!     Err(_) => return,
//! };
//! let _ = epd_spi;
//! ```

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{self, ErrorKind, ErrorType, MODE_0, Mode, Operation, SpiBus, SpiDevice};
use embedded_hal_bus::spi::{AtomicDevice, AtomicError, DeviceError};
use log::warn;

pub use embedded_hal_bus::util::AtomicCell;

/// SPI mode used by the panel (CPOL 0, CPHA 0)
pub const SPI_MODE: Mode = MODE_0;

/// SPI clock frequency used by the panel
pub const SPI_FREQUENCY_HZ: u32 = 4_000_000;

/// Default number of attempts to acquire the bus
pub const DEFAULT_LOCK_ATTEMPTS: u32 = 100;

/// Default wait between acquisition attempts in microseconds
pub const DEFAULT_LOCK_RETRY_US: u32 = 100;

/// Errors raised by [`SharedSpiDevice`]
#[derive(Debug)]
pub enum TransportError<BusErr, CsErr> {
    /// Error from the underlying bus
    Bus(BusErr),
    /// Error driving the chip-select pin
    ChipSelect(CsErr),
    /// The bus stayed held by another device for every acquisition attempt
    BusUnavailable,
}

impl<BusErr, CsErr> From<DeviceError<BusErr, CsErr>> for TransportError<BusErr, CsErr> {
    fn from(err: DeviceError<BusErr, CsErr>) -> Self {
        match err {
            DeviceError::Spi(e) => Self::Bus(e),
            DeviceError::Cs(e) => Self::ChipSelect(e),
        }
    }
}

impl<BusErr: spi::Error, CsErr: Debug> spi::Error for TransportError<BusErr, CsErr> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Bus(e) => e.kind(),
            Self::ChipSelect(_) => ErrorKind::ChipSelectFault,
            Self::BusUnavailable => ErrorKind::Other,
        }
    }
}

impl<BusErr: Debug, CsErr: Debug> core::fmt::Display for TransportError<BusErr, CsErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "SPI bus error: {e:?}"),
            Self::ChipSelect(e) => write!(f, "Chip select error: {e:?}"),
            Self::BusUnavailable => write!(f, "SPI bus unavailable"),
        }
    }
}

impl<BusErr: Debug, CsErr: Debug> core::error::Error for TransportError<BusErr, CsErr> {}

/// [`SpiDevice`] on a shared bus with bounded acquisition
///
/// ## Type Parameters
///
/// * `DEV` - Device on the shared bus, normally an [`AtomicDevice`]
/// * `W` - Delay used to wait between acquisition attempts
pub struct SharedSpiDevice<DEV, W> {
    device: DEV,
    delay: W,
    lock_attempts: u32,
    retry_interval_us: u32,
}

impl<DEV, W> SharedSpiDevice<DEV, W> {
    /// Wrap a device whose transactions fail with [`AtomicError::Busy`] while the bus is held
    pub fn new(device: DEV, delay: W) -> Self {
        Self {
            device,
            delay,
            lock_attempts: DEFAULT_LOCK_ATTEMPTS,
            retry_interval_us: DEFAULT_LOCK_RETRY_US,
        }
    }

    /// Set the number of acquisition attempts (at least one is always made)
    pub fn with_lock_attempts(mut self, attempts: u32) -> Self {
        self.lock_attempts = attempts.max(1);
        self
    }

    /// Set the wait between acquisition attempts
    pub fn with_retry_interval_us(mut self, interval_us: u32) -> Self {
        self.retry_interval_us = interval_us;
        self
    }

    /// Give back the wrapped device and delay
    pub fn release(self) -> (DEV, W) {
        (self.device, self.delay)
    }
}

impl<'a, BUS, CS, D, W> SharedSpiDevice<AtomicDevice<'a, BUS, CS, D>, W>
where
    BUS: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    /// Attach a new device to a bus shared through an [`AtomicCell`]
    ///
    /// `delay` serves `Operation::DelayNs` inside transactions, `retry_delay`
    /// the waits between acquisition attempts. CS is driven high (inactive).
    pub fn on_bus(
        bus: &'a AtomicCell<BUS>,
        cs: CS,
        delay: D,
        retry_delay: W,
    ) -> Result<Self, CS::Error> {
        let device = AtomicDevice::new(bus, cs, delay)?;
        Ok(Self::new(device, retry_delay))
    }
}

impl<DEV, W, BusErr, CsErr> ErrorType for SharedSpiDevice<DEV, W>
where
    DEV: ErrorType<Error = AtomicError<DeviceError<BusErr, CsErr>>>,
    BusErr: spi::Error,
    CsErr: Debug,
{
    type Error = TransportError<BusErr, CsErr>;
}

impl<DEV, W, BusErr, CsErr> SpiDevice for SharedSpiDevice<DEV, W>
where
    DEV: SpiDevice<Error = AtomicError<DeviceError<BusErr, CsErr>>>,
    W: DelayNs,
    BusErr: spi::Error,
    CsErr: Debug,
{
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for attempt in 1..=self.lock_attempts {
            match self.device.transaction(operations) {
                Ok(()) => return Ok(()),
                Err(AtomicError::Other(e)) => return Err(e.into()),
                Err(AtomicError::Busy) => {
                    if attempt < self.lock_attempts {
                        self.delay.delay_us(self.retry_interval_us);
                    }
                }
            }
        }
        warn!("SPI bus still held after {} attempts", self.lock_attempts);
        Err(TransportError::BusUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::convert::Infallible;

    type AtomicResult = Result<(), AtomicError<DeviceError<ErrorKind, Infallible>>>;

    struct RecordingBus<'a> {
        written: &'a RefCell<Vec<u8>>,
        fail_writes: bool,
    }

    impl ErrorType for RecordingBus<'_> {
        type Error = ErrorKind;
    }

    impl SpiBus for RecordingBus<'_> {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            if self.fail_writes {
                return Err(ErrorKind::Other);
            }
            self.written.borrow_mut().extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            read.fill(0);
            self.write(write)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct RecordingPin<'a> {
        levels: &'a RefCell<Vec<bool>>,
    }

    impl embedded_hal::digital::ErrorType for RecordingPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.borrow_mut().push(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.borrow_mut().push(true);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct RecordingDelay {
        waits_ns: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waits_ns.push(ns);
        }
    }

    /// Device whose bus is held by someone else for the first `busy_for` attempts
    #[derive(Debug, Default)]
    struct ContendedDevice {
        busy_for: usize,
        attempts: usize,
    }

    impl ErrorType for ContendedDevice {
        type Error = AtomicError<DeviceError<ErrorKind, Infallible>>;
    }

    impl SpiDevice for ContendedDevice {
        fn transaction(&mut self, _operations: &mut [Operation<'_, u8>]) -> AtomicResult {
            self.attempts += 1;
            if self.attempts <= self.busy_for {
                Err(AtomicError::Busy)
            } else {
                Ok(())
            }
        }
    }

    fn contended(busy_for: usize) -> SharedSpiDevice<ContendedDevice, RecordingDelay> {
        SharedSpiDevice::new(
            ContendedDevice {
                busy_for,
                attempts: 0,
            },
            RecordingDelay::default(),
        )
    }

    #[test]
    fn test_spi_mode_and_frequency() {
        assert_eq!(SPI_MODE, MODE_0);
        assert_eq!(SPI_FREQUENCY_HZ, 4_000_000);
    }

    #[test]
    fn test_each_transaction_framed_by_chip_select() {
        let written = RefCell::new(Vec::new());
        let levels = RefCell::new(Vec::new());
        let bus = AtomicCell::new(RecordingBus {
            written: &written,
            fail_writes: false,
        });
        let mut device = SharedSpiDevice::on_bus(
            &bus,
            RecordingPin { levels: &levels },
            RecordingDelay::default(),
            RecordingDelay::default(),
        )
        .unwrap();

        device.write(&[0x12]).unwrap();
        device.write(&[0x24]).unwrap();

        // idle high on attach, then one low/high pair per transaction
        assert_eq!(*levels.borrow(), [true, false, true, false, true]);
        assert_eq!(*written.borrow(), [0x12, 0x24]);
    }

    #[test]
    fn test_bus_error_keeps_chip_select_framing() {
        let written = RefCell::new(Vec::new());
        let levels = RefCell::new(Vec::new());
        let bus = AtomicCell::new(RecordingBus {
            written: &written,
            fail_writes: true,
        });
        let mut device = SharedSpiDevice::on_bus(
            &bus,
            RecordingPin { levels: &levels },
            RecordingDelay::default(),
            RecordingDelay::default(),
        )
        .unwrap();

        let result = device.write(&[0x12]);
        assert!(matches!(result, Err(TransportError::Bus(ErrorKind::Other))));
        assert_eq!(*levels.borrow(), [true, false, true]);

        // the failed transaction released the bus
        let result = device.write(&[0x24]);
        assert!(matches!(result, Err(TransportError::Bus(ErrorKind::Other))));
        assert_eq!(*levels.borrow(), [true, false, true, false, true]);
        assert!(written.borrow().is_empty());
    }

    #[test]
    fn test_held_bus_reports_unavailable_after_bounded_attempts() {
        let mut device = contended(usize::MAX)
            .with_lock_attempts(3)
            .with_retry_interval_us(50);

        let result = device.write(&[0x12]);

        assert!(matches!(result, Err(TransportError::BusUnavailable)));
        assert_eq!(
            spi::Error::kind(&TransportError::<ErrorKind, Infallible>::BusUnavailable),
            ErrorKind::Other
        );
        let (inner, delay) = device.release();
        assert_eq!(inner.attempts, 3);
        // two waits between three attempts
        assert_eq!(delay.waits_ns, [50_000, 50_000]);
    }

    #[test]
    fn test_transaction_succeeds_once_holder_releases_bus() {
        let mut device = contended(2).with_retry_interval_us(10);

        device.write(&[0x71]).unwrap();

        let (inner, delay) = device.release();
        assert_eq!(inner.attempts, 3);
        assert_eq!(delay.waits_ns, [10_000, 10_000]);
    }

    #[test]
    fn test_zero_lock_attempts_still_tries_once() {
        let mut device = contended(0).with_lock_attempts(0);

        device.write(&[0x71]).unwrap();
        assert_eq!(device.release().0.attempts, 1);

        let mut device = contended(1).with_lock_attempts(0);
        assert!(matches!(
            device.write(&[0x71]),
            Err(TransportError::BusUnavailable)
        ));
    }

    #[test]
    fn test_device_errors_map_to_transport_errors() {
        let err: TransportError<ErrorKind, Infallible> = DeviceError::Spi(ErrorKind::Overrun).into();
        assert!(matches!(err, TransportError::Bus(ErrorKind::Overrun)));
        assert_eq!(spi::Error::kind(&err), ErrorKind::Overrun);
    }
}
