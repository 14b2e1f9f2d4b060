pub mod api;
pub mod core;

/// 安装日志后端，重复调用无副作用
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("interview_lens"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // RUST_LOG 优先，默认 info
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}
