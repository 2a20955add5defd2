use std::io::{stdin, Read};

use saba_blocks::{vt100_target_fn, Vt100};

fn main() -> Result<(), std::io::Error> {
    let mut machine = Vt100::new(vt100_target_fn(|event| {
        println!("{event:?}");
    }));

    let mut r = stdin();
    let mut buf = [0_u8; 64];
    loop {
        let read_len = r.read(&mut buf[..])?;
        if read_len == 0 {
            return Ok(());
        }
        machine.write(&buf[..read_len]);
    }
}
