//! Exec from a thread other than the thread group leader, while a third thread is
//! still running. The exec'd program exits with code 5.

use std::os::unix::process::CommandExt;
use std::process::Command;
use std::thread;
use std::time::Duration;

fn main() {
    let mut cmd = Command::new("/bin/sh");
    cmd.args(&["-c", "exit 5"]);

    thread::spawn(|| thread::sleep(Duration::from_secs(60)));

    // Give the sleeper time to start, so it is live at the exec.
    thread::sleep(Duration::from_millis(100));

    let err = thread::spawn(move || cmd.exec()).join();
    panic!("exec failed: {:?}", err);
}
