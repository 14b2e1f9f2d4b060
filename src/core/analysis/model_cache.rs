use super::detector::{Detector, DetectorError};
use super::features::FeatureResult;
use crate::core::video::Frame;
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::fmt::Display;

type Loader<T> = Box<dyn Fn() -> Result<T, String> + Send + Sync>;

/// 进程级懒加载模型
///
/// 第一次 `get()` 时调用 loader 构造，之后一直复用；可以放进 `static`，
/// 在并行检测的工作线程之间只读共享。loader 失败不会被缓存，下次调用会重试加载。
pub struct LazyModel<T> {
    name: &'static str,
    cell: OnceCell<T>,
    loader: Loader<T>,
}

impl<T> LazyModel<T> {
    pub fn new<F, E>(name: &'static str, loader: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Display,
    {
        Self {
            name,
            cell: OnceCell::new(),
            loader: Box::new(move || loader().map_err(|e| e.to_string())),
        }
    }

    pub fn get(&self) -> Result<&T, DetectorError> {
        self.cell.get_or_try_init(|| {
            info!("📦 Loading model {}...", self.name);
            match (self.loader)() {
                Ok(model) => {
                    info!("✅ Model {} loaded", self.name);
                    Ok(model)
                }
                Err(e) => {
                    warn!("❌ Model {} failed to load: {}", self.name, e);
                    Err(DetectorError::ModelLoad(format!("{}: {}", self.name, e)))
                }
            }
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<D: Detector> Detector for LazyModel<D> {
    fn name(&self) -> &str {
        self.name
    }

    fn detect(&self, frame: &Frame) -> Result<FeatureResult, DetectorError> {
        self.get()?.detect(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::detector::{detect_or_absent, MockDetector};
    use crate::core::analysis::features::FaceDetection;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let model = LazyModel::new("counter", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(42u32)
        });

        assert!(!model.is_loaded());
        assert_eq!(*model.get().unwrap(), 42);
        assert_eq!(*model.get().unwrap(), 42);
        assert!(model.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_failure_is_model_load_error() {
        let model: LazyModel<u32> = LazyModel::new("broken", || Err("missing file"));
        assert!(matches!(model.get(), Err(DetectorError::ModelLoad(_))));
        assert!(!model.is_loaded());
    }

    #[test]
    fn test_lazy_detector() {
        let model = LazyModel::new("face", || {
            Ok::<_, String>(MockDetector::with_pattern(|_| {
                FeatureResult::Face(FaceDetection { present: true })
            }))
        });
        let frame = Frame::new(1, 1, vec![0, 0, 0], 0).unwrap();

        assert!(detect_or_absent(&model, &frame).is_signal_present());
        assert_eq!(model.name(), "face");
    }

    #[test]
    fn test_failed_load_degrades_to_not_found() {
        let model: LazyModel<MockDetector> = LazyModel::new("face", || Err("no weights"));
        let frame = Frame::new(1, 1, vec![0, 0, 0], 0).unwrap();
        assert_eq!(detect_or_absent(&model, &frame), FeatureResult::NotFound);
    }
}
