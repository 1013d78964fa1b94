//! 마커 템플릿 저장소.
//!
//! 기준 해상도(너비 2560)에서 잘라낸 마커 원본을 로드하고,
//! 대상 해상도 비율로 스케일한 사본을 디스크에 캐싱한다.
//! 캐시 파일명에 대상 너비가 들어가므로 해상도가 바뀌면
//! 캐시 미스가 나고 다시 스케일한다.

use fast_image_resize::{images::Image as FirImage, ResizeAlg, ResizeOptions, Resizer};
use heistguard_core::error::CoreError;
use image::{DynamicImage, GrayImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 마커 원본 + 기준 해상도
pub struct ReferenceTemplate {
    /// 원본 픽셀 (불변)
    image: DynamicImage,
    /// 원본이 잘려나온 화면의 기준 너비 (픽셀)
    baseline_width: u32,
    /// 원본 파일 경로 (캐시 파일명 유도용)
    source_path: PathBuf,
    /// 캐시 디렉토리 (미지정 시 원본 옆)
    cache_dir: Option<PathBuf>,
}

/// 대상 너비에 맞춰 스케일된 템플릿
#[derive(Debug, Clone)]
pub struct ScaledTemplate {
    /// 그레이스케일 픽셀 (매칭용)
    pub gray: GrayImage,
    /// 스케일 기준이 된 대상 화면 너비
    pub target_width: u32,
}

impl ScaledTemplate {
    /// 템플릿 너비
    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    /// 템플릿 높이
    pub fn height(&self) -> u32 {
        self.gray.height()
    }
}

impl ReferenceTemplate {
    /// 마커 원본 로드
    pub fn load(
        path: impl AsRef<Path>,
        baseline_width: u32,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if baseline_width == 0 {
            return Err(CoreError::Template("기준 너비가 0".to_string()));
        }
        let image = image::open(path)
            .map_err(|e| CoreError::Template(format!("마커 로드 실패: {}: {e}", path.display())))?;

        debug!(
            "마커 로드: {} ({}x{}, 기준 너비 {baseline_width})",
            path.display(),
            image.width(),
            image.height()
        );

        Ok(Self {
            image,
            baseline_width,
            source_path: path.to_path_buf(),
            cache_dir,
        })
    }

    /// 대상 너비 기준 스케일 치수 계산.
    ///
    /// `scale = target_width / baseline_width`, 각 치수는 반올림.
    /// 결과 치수는 항상 1 이상이다.
    pub fn scaled_dimensions(&self, target_width: u32) -> (u32, u32) {
        let scale = target_width as f64 / self.baseline_width as f64;
        let w = ((self.image.width() as f64 * scale).round() as u32).max(1);
        let h = ((self.image.height() as f64 * scale).round() as u32).max(1);
        (w, h)
    }

    /// 대상 너비에 맞는 스케일 템플릿 반환.
    ///
    /// 해당 너비의 캐시 파일이 있으면 재사용하고, 없으면 리사이즈 후
    /// 저장한다. 같은 너비로 두 번 호출하면 동일한 바이트가 나온다.
    pub fn scaled_for(&self, target_width: u32) -> Result<ScaledTemplate, CoreError> {
        if target_width == 0 {
            return Err(CoreError::Template("대상 너비가 0".to_string()));
        }

        let cache_path = self.cache_path(target_width);
        if cache_path.exists() {
            let cached = image::open(&cache_path).map_err(|e| {
                CoreError::Template(format!("캐시 로드 실패: {}: {e}", cache_path.display()))
            })?;
            debug!("스케일 캐시 히트: {}", cache_path.display());
            return Ok(ScaledTemplate {
                gray: cached.to_luma8(),
                target_width,
            });
        }

        let (w, h) = self.scaled_dimensions(target_width);
        let resized = fast_resize(&self.image, w, h)?;

        if let Some(parent) = cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        resized.save(&cache_path).map_err(|e| {
            CoreError::Template(format!("캐시 저장 실패: {}: {e}", cache_path.display()))
        })?;
        info!("스케일 템플릿 생성: {} ({w}x{h})", cache_path.display());

        Ok(ScaledTemplate {
            gray: resized.to_luma8(),
            target_width,
        })
    }

    /// 캐시 파일 경로 — 파일명에 대상 너비가 키로 들어간다
    fn cache_path(&self, target_width: u32) -> PathBuf {
        let stem = self
            .source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "marker".to_string());
        let dir = self
            .cache_dir
            .clone()
            .or_else(|| self.source_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join(format!("{stem}_w{target_width}.png"))
    }
}

/// 고속 리사이즈 (bilinear convolution)
fn fast_resize(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage, CoreError> {
    let (src_w, src_h) = (image.width(), image.height());

    if src_w == width && src_h == height {
        return Ok(image.clone());
    }
    if src_w == 0 || src_h == 0 {
        return Err(CoreError::Template("소스 이미지 크기 0".to_string()));
    }

    let src_rgba = image.to_rgba8();

    let src_image = FirImage::from_vec_u8(
        src_w,
        src_h,
        src_rgba.into_raw(),
        fast_image_resize::PixelType::U8x4,
    )
    .map_err(|e| CoreError::Template(format!("소스 이미지 생성 실패: {e}")))?;

    let mut dst_image = FirImage::new(width, height, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::Template(format!("리사이즈 실패: {e}")))?;

    let result = RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| CoreError::Template("결과 이미지 생성 실패".to_string()))?;

    Ok(DynamicImage::ImageRgba8(result))
}
