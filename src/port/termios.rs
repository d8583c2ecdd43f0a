//! Raw line discipline for the pattern protocol.
//!
//! The pattern stream is byte oriented with no framing, so every form of
//! echo, translation and signal interpretation has to be switched off.

use super::baud;

/// Input flags cleared for raw input.
const RAW_IFLAG_CLEAR: libc::tcflag_t = libc::IGNBRK
    | libc::BRKINT
    | libc::PARMRK
    | libc::ISTRIP
    | libc::INLCR
    | libc::IGNCR
    | libc::ICRNL
    | libc::IXON
    | libc::IXOFF
    | libc::IXANY
    | libc::INPCK;

/// Output post-processing flags cleared for raw output.
#[cfg(any(target_os = "linux", target_os = "android"))]
const RAW_OFLAG_CLEAR: libc::tcflag_t = libc::OPOST
    | libc::ONLCR
    | libc::OCRNL
    | libc::ONOCR
    | libc::ONLRET
    | libc::OFILL
    | libc::OLCUC;

#[cfg(not(any(target_os = "linux", target_os = "android")))]
const RAW_OFLAG_CLEAR: libc::tcflag_t =
    libc::OPOST | libc::ONLCR | libc::OCRNL | libc::ONOCR | libc::ONLRET | libc::OFILL;

/// Local flags cleared for raw input.
const RAW_LFLAG_CLEAR: libc::tcflag_t =
    libc::ECHO | libc::ECHOE | libc::ECHONL | libc::ICANON | libc::IEXTEN | libc::ISIG;

/// Rewrite `attrs` for an 8N1, no-flow-control raw line at `baud_rate`.
///
/// Parity generation and checking stay off. `PARMRK` is cleared so a
/// received `0xFF` arrives as one byte instead of the escaped `0xFF 0xFF`.
pub fn apply_raw_line_discipline(attrs: &mut libc::termios, baud_rate: i64) {
    let speed = baud::line_speed(baud_rate);
    // SAFETY: attrs is a valid, exclusively borrowed termios value.
    unsafe {
        libc::cfsetispeed(attrs, speed);
        libc::cfsetospeed(attrs, speed);
    }

    attrs.c_cflag &= !libc::CSIZE;
    attrs.c_cflag |= libc::CS8;

    attrs.c_cflag &= !libc::PARENB;
    attrs.c_cflag |= libc::PARODD;
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        attrs.c_cflag |= libc::CMSPAR;
    }

    attrs.c_cflag &= !libc::CSTOPB;
    attrs.c_cflag &= !libc::CRTSCTS;

    attrs.c_lflag &= !RAW_LFLAG_CLEAR;
    attrs.c_iflag &= !RAW_IFLAG_CLEAR;
    attrs.c_iflag |= libc::IGNPAR;
    attrs.c_oflag &= !RAW_OFLAG_CLEAR;

    attrs.c_cc[libc::VMIN] = 1;
    attrs.c_cc[libc::VTIME] = 0;

    attrs.c_cflag |= libc::CLOCAL | libc::CREAD;
}
