use defmt::global_logger;

#[global_logger]
struct KernelLogger;

static mut ENCODER: defmt::Encoder = ::defmt::Encoder::new();

::defmt::timestamp!("{=u32:us}", 0);

// Safety: defmt::Logger requires that only one thread access Logger at once.
// The kernel is single-threaded, so we don't need to guard this.
unsafe impl defmt::Logger for KernelLogger {
    fn acquire() {
        // Safety: kernel is single threaded so static mut is safe
        unsafe { ENCODER.start_frame(|b| crate::arch::log(b)) };
    }

    unsafe fn flush() {}

    unsafe fn release() {
        ENCODER.end_frame(|b| crate::arch::log(b));
    }

    unsafe fn write(bytes: &[u8]) {
        ENCODER.write(bytes, |b| crate::arch::log(b));
    }
}
