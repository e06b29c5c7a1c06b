//! USB HID keyboard implementation for ATmega32U4.
//!
//! One HID interface carrying a 6KRO keyboard report (report id 1), a
//! consumer-control report for media keys (report id 2) and the host's LED
//! output report. Uses direct register access via avr-device and is driven by
//! polling from the main loop.

use avr_device::atmega32u4::Peripherals;
use heapless::Vec;
use lapkey_core::{KeyboardReport, KeyboardTransport, Leds};

const KEYBOARD_REPORT_ID: u8 = 1;
const CONSUMER_REPORT_ID: u8 = 2;

// USB endpoint configuration for keyboard HID
const EP0_SIZE: u8 = 64; // Control endpoint size
const EP1_SIZE: u8 = 16; // Interrupt IN endpoint size (largest report is 9 bytes)

/// HID report descriptor: keyboard with LEDs, then consumer control.
#[rustfmt::skip]
const HID_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, KEYBOARD_REPORT_ID, // Report ID
    // Modifier keys (8 bits)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224) - LCtrl
    0x29, 0xE7, //   Usage Maximum (231) - RGui
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    // Reserved byte
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    // LEDs (5 bits)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    // LED padding (3 bits)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    // Keycodes (6 bytes)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection

    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x85, CONSUMER_REPORT_ID, // Report ID
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x03, // Logical Maximum (1023)
    0x19, 0x00, //   Usage Minimum (0)
    0x2A, 0xFF, 0x03, // Usage Maximum (1023)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

// USB descriptors
static DEVICE_DESCRIPTOR: [u8; 18] = [
    18,   // bLength
    1,    // bDescriptorType (Device)
    0x00, 0x02, // bcdUSB (2.0)
    0,    // bDeviceClass (defined at interface level)
    0,    // bDeviceSubClass
    0,    // bDeviceProtocol
    EP0_SIZE, // bMaxPacketSize0
    0xC0, 0x16, // idVendor (0x16C0, Van Ooijen Technische Informatica)
    0xDB, 0x27, // idProduct (0x27DB, shared keyboard PID)
    0x01, 0x00, // bcdDevice (1.0)
    1,    // iManufacturer
    2,    // iProduct
    0,    // iSerialNumber
    1,    // bNumConfigurations
];

static CONFIG_DESCRIPTOR: [u8; 34] = [
    // Configuration descriptor
    9,    // bLength
    2,    // bDescriptorType (Configuration)
    34, 0, // wTotalLength
    1,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes (bus powered)
    50,   // bMaxPower (100mA)
    // Interface descriptor
    9,    // bLength
    4,    // bDescriptorType (Interface)
    0,    // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    0,    // bInterfaceSubClass (none: report ids rule out the boot protocol)
    0,    // bInterfaceProtocol
    0,    // iInterface
    // HID descriptor
    9,    // bLength
    0x21, // bDescriptorType (HID)
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    HID_REPORT_DESCRIPTOR.len() as u8, 0, // wDescriptorLength
    // Endpoint descriptor (EP1 IN, interrupt)
    7,    // bLength
    5,    // bDescriptorType (Endpoint)
    0x81, // bEndpointAddress (EP1 IN)
    0x03, // bmAttributes (Interrupt)
    EP1_SIZE, 0, // wMaxPacketSize
    10,   // bInterval (10ms polling)
];

/// String descriptor 0 (language ID)
static STRING_DESC_0: [u8; 4] = [4, 3, 0x09, 0x04]; // English (US)

const MANUFACTURER: &str = "lapkey";

/// Build a UTF-16LE string descriptor from ASCII text.
fn string_descriptor(text: &str) -> Vec<u8, 64> {
    let mut desc = Vec::new();
    let _ = desc.extend_from_slice(&[0, 3]);
    for byte in text.bytes() {
        if desc.extend_from_slice(&[byte, 0]).is_err() {
            break;
        }
    }
    desc[0] = desc.len() as u8;
    desc
}

/// USB device state.
pub struct UsbKeyboard<'a> {
    dp: &'a Peripherals,
    product: &'static str,
    configured: bool,
    last_report: KeyboardReport,
    last_media: u16,
    leds: Leds,
}

impl<'a> UsbKeyboard<'a> {
    pub fn new(dp: &'a Peripherals, product: &'static str) -> Self {
        Self {
            dp,
            product,
            configured: false,
            last_report: KeyboardReport::empty(),
            last_media: 0,
            leds: Leds::default(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Initialize the ATmega32U4 USB controller.
    pub fn init(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        // Enable USB pad regulator
        usb.uhwcon.write(|w| w.uvrege().set_bit());

        // Enable USB controller and VBUS pad
        usb.usbcon
            .write(|w| w.usbe().set_bit().otgpade().set_bit());

        // Configure PLL for 16MHz crystal -> 96MHz PLL -> 48MHz USB clock
        dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());

        // Wait for PLL lock
        while dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        // Enable USB clock
        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());

        // Attach to bus (clear DETACH)
        usb.udcon.modify(|_, w| w.detach().clear_bit());

        // Enable End-Of-Reset interrupt
        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    /// Poll for USB events and handle them.
    fn poll_bus(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        let udint = usb.udint.read();

        // End of reset
        if udint.eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_ep0();
            self.configured = false;
        }

        // Check for SETUP packet on EP0
        self.select_endpoint(0);
        if usb.ueintx.read().rxstpi().bit_is_set() {
            self.handle_setup();
        }
    }

    /// Queue one input report on EP1. Gives up silently if the host does not
    /// pick up the previous one in time.
    fn write_in_report(&self, bytes: &[u8]) -> bool {
        if !self.configured {
            return false;
        }

        let dp = self.dp;
        let usb = &dp.USB_DEVICE;
        self.select_endpoint(1);

        // Wait for endpoint ready (RWAL set means we can write)
        let mut timeout: u16 = 0xFFFF;
        while usb.ueintx.read().rwal().bit_is_clear() {
            timeout = timeout.wrapping_sub(1);
            if timeout == 0 {
                return false;
            }
        }

        for &byte in bytes {
            usb.uedatx.write(|w| w.bits(byte));
        }

        // Clear FIFOCON and TXINI to send
        usb.ueintx
            .modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());
        true
    }

    fn configure_ep0(&self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(0);
        // Enable EP0 as control endpoint, 64 bytes
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        usb.uecfg1x.write(|w| w.epsize().bits(0b011).alloc().set_bit());
    }

    fn configure_ep1(&self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(1);
        usb.ueconx.write(|w| w.epen().set_bit());
        // Interrupt IN endpoint, 16 bytes
        usb.uecfg0x
            .write(|w| w.eptype().bits(0b11).epdir().set_bit());
        usb.uecfg1x.write(|w| w.epsize().bits(0b001).alloc().set_bit());
    }

    fn select_endpoint(&self, ep: u8) {
        self.dp.USB_DEVICE.uenum.write(|w| w.bits(ep & 0x07));
    }

    /// Finish a control transfer without data by sending a ZLP.
    fn ack_status(&self) {
        self.dp
            .USB_DEVICE
            .ueintx
            .modify(|_, w| w.txini().clear_bit());
    }

    fn handle_setup(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        // Read 8-byte SETUP packet
        let bm_request_type = usb.uedatx.read().bits();
        let b_request = usb.uedatx.read().bits();
        let w_value_l = usb.uedatx.read().bits();
        let w_value_h = usb.uedatx.read().bits();
        let _w_index_l = usb.uedatx.read().bits();
        let _w_index_h = usb.uedatx.read().bits();
        let w_length_l = usb.uedatx.read().bits();
        let w_length_h = usb.uedatx.read().bits();

        // Acknowledge SETUP
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        let w_length = (w_length_h as u16) << 8 | w_length_l as u16;

        match (bm_request_type, b_request) {
            // GET_DESCRIPTOR
            (0x80, 0x06) => match (w_value_h, w_value_l) {
                (1, _) => self.send_descriptor(&DEVICE_DESCRIPTOR, w_length),
                (2, _) => self.send_descriptor(&CONFIG_DESCRIPTOR, w_length),
                (3, 0) => self.send_descriptor(&STRING_DESC_0, w_length),
                (3, 1) => self.send_descriptor(&string_descriptor(MANUFACTURER), w_length),
                (3, 2) => self.send_descriptor(&string_descriptor(self.product), w_length),
                _ => self.stall(),
            },

            // SET_ADDRESS
            (0x00, 0x05) => {
                // Send ZLP first, then set address
                self.ack_status();
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.udaddr
                    .write(|w| w.uadd().bits(w_value_l & 0x7F).adden().set_bit());
            }

            // SET_CONFIGURATION
            (0x00, 0x09) => {
                self.ack_status();
                self.configure_ep1();
                self.configured = true;
            }

            // GET_CONFIGURATION
            (0x80, 0x08) => {
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.uedatx
                    .write(|w| w.bits(if self.configured { 1 } else { 0 }));
                self.ack_status();
            }

            // HID GET_DESCRIPTOR (interface-level)
            (0x81, 0x06) => match w_value_h {
                0x22 => self.send_descriptor(HID_REPORT_DESCRIPTOR, w_length),
                _ => self.stall(),
            },

            // HID SET_REPORT: the host's LED state
            (0x21, 0x09) => {
                while usb.ueintx.read().rxouti().bit_is_clear() {}
                // With report ids the LED byte follows the id byte.
                let mut leds = 0;
                for _ in 0..w_length {
                    leds = usb.uedatx.read().bits();
                }
                usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
                self.ack_status();
                if w_value_h == 2 {
                    self.leds = Leds::from(leds);
                }
            }

            // HID SET_IDLE, SET_PROTOCOL
            (0x21, 0x0A) | (0x21, 0x0B) => self.ack_status(),

            _ => self.stall(),
        }
    }

    fn send_descriptor(&self, desc: &[u8], max_length: u16) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;
        let len = core::cmp::min(desc.len(), max_length as usize);
        let mut sent = 0;

        while sent < len {
            while usb.ueintx.read().txini().bit_is_clear() {}

            let chunk_end = core::cmp::min(sent + EP0_SIZE as usize, len);
            for &byte in &desc[sent..chunk_end] {
                usb.uedatx.write(|w| w.bits(byte));
            }

            usb.ueintx.modify(|_, w| w.txini().clear_bit());
            sent = chunk_end;
        }

        // Wait for status stage (host sends ZLP)
        while usb.ueintx.read().rxouti().bit_is_clear() {}
        usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
    }

    fn stall(&self) {
        self.dp
            .USB_DEVICE
            .ueconx
            .modify(|_, w| w.stallrq().set_bit());
    }
}

impl KeyboardTransport for UsbKeyboard<'_> {
    /// Send a keyboard report if it has changed.
    fn send_report(&mut self, report: &KeyboardReport) {
        if *report == self.last_report {
            return;
        }
        let mut bytes = [KEYBOARD_REPORT_ID; 9];
        bytes[1..].copy_from_slice(&report.to_bytes());
        if self.write_in_report(&bytes) {
            self.last_report = *report;
        }
    }

    fn set_media(&mut self, usage: u16) {
        if usage == self.last_media {
            return;
        }
        let [lo, hi] = usage.to_le_bytes();
        if self.write_in_report(&[CONSUMER_REPORT_ID, lo, hi]) {
            self.last_media = usage;
        }
    }

    fn leds(&self) -> Leds {
        self.leds
    }

    fn poll(&mut self) {
        self.poll_bus();
    }
}
