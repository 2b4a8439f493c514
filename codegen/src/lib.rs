//! Build-time generation of a board's static task list from a small
//! declarative JSON config, the way a `build.rs` would generate a hardware
//! register map from an SVD file. Keeps board-specific task lists out of
//! kernel source.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Task {
    pub name: String,
    /// Name of the `extern "C" fn(arg: i32)` entry point, in scope wherever
    /// the generated file is `include!`d.
    pub entrypoint: String,
    pub priority: u8,
    pub arg: i32,
}

impl TaskList {
    fn gen_code(&self) -> String {
        let mut code = String::from("pub static TASKS: &[kernel::TaskDesc] = &[\n");
        for task in &self.tasks {
            code += &format!(
                "    kernel::TaskDesc {{ name: {:?}, entrypoint: {} as kernel::TaskFn, priority: {}, arg: {} }},\n",
                task.name, task.entrypoint, task.priority, task.arg,
            );
        }
        code += "];\n";

        for (i, task) in self.tasks.iter().enumerate() {
            code += &format!(
                "pub const TASK_{}_INDEX: usize = {};\n",
                task.name.to_uppercase(),
                i
            );
        }
        code
    }
}

/// Reads the task list named by the `TASK_LIST` environment variable and
/// writes a `codegen.rs` containing a `TASKS` array into `OUT_DIR`. Call
/// from a board crate's `build.rs`.
pub fn gen_tasklist() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-env-changed=TASK_LIST");
    let path = env::var("TASK_LIST")?;
    println!("cargo:rerun-if-changed={}", path);
    let raw = fs::read(path)?;
    let task_list: TaskList = serde_json::from_slice(&raw)?;
    let code = task_list.gen_code();
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR environment variable not set"));
    fs::write(out_dir.join("codegen.rs"), code.as_bytes())?;
    Ok(())
}
