/// Note that the cwd, env, and command args are preserved in the ultimate
/// call to `execvp(3)`, so the target command runs exactly as requested, only
/// confined.
fn main() -> ! {
    agent_studio_linux_sandbox::run_main()
}
