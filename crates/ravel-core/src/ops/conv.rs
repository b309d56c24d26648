//! Convolution layout transform: `im2col` rearranges sliding kernel
//! windows of a 4-D image into a 6-D columnar tensor, `col2im` is its
//! additive adjoint. Both are built from padding, strided windowed views
//! and accumulation: `kh*kw` view copies, never a per-pixel loop.
//!
//! The height axis consistently uses `kh`/`sy`/`ph` and the width axis
//! `kw`/`sx`/`pw`.

use crate::{
    add_into, copy_into, pad, shape, DimSpec, Enforcer, InvariantError, OperationError, Tensor,
    TensorDType,
};

/// Output extent of one spatial axis. With `cover_all`, windows may start
/// past the nominal padded boundary so every input position is covered.
pub fn out_size(
    size: usize,
    k: usize,
    s: usize,
    p: usize,
    cover_all: bool,
) -> Result<usize, InvariantError> {
    Enforcer::check_positive("kernel size", k)?;
    Enforcer::check_positive("stride", s)?;
    let reach = size + 2 * p + if cover_all { s - 1 } else { 0 };
    if reach < k {
        return Err(InvariantError::InvalidArgument(format!(
            "output size for extent {size} with kernel {k}, stride {s}, padding {p} is not positive"
        )));
    }
    Ok((reach - k) / s + 1)
}

/// Rearranges `img[N, C, H, W]` into columns `[N, C, kh, kw, outH, outW]`.
///
/// The image is padded by `(ph, ph + sy - 1)` / `(pw, pw + sx - 1)` with
/// `pval`; the extra `stride - 1` on the high side keeps every window
/// fully inside the padded extent even when `cover_all` stretches past
/// the nominal boundary. For each kernel offset `(i, j)` one strided view
/// of the padded image is copied into the output slice `[:, :, i, j, :, :]`.
pub fn im2col<T: TensorDType>(
    img: &Tensor<T>,
    kh: usize,
    kw: usize,
    sy: usize,
    sx: usize,
    ph: usize,
    pw: usize,
    pval: T,
    cover_all: bool,
) -> Result<Tensor<T>, OperationError> {
    Enforcer::assert_rank(img.shape(), 4)?;
    let [n, c, h, w] = img.shape().try_into()?;
    let out_h = out_size(h, kh, sy, ph, cover_all)?;
    let out_w = out_size(w, kw, sx, pw, cover_all)?;
    log::trace!(
        "im2col {:?} k=({kh},{kw}) s=({sy},{sx}) p=({ph},{pw}) -> out=({out_h},{out_w})",
        img.shape()
    );

    let padded = pad(
        img,
        &[(0, 0), (0, 0), (ph, ph + sy - 1), (pw, pw + sx - 1)],
        pval,
    )?;
    let out = Tensor::zeros(shape![n, c, kh, kw, out_h, out_w], img.options());
    let (p_h, p_w) = (padded.shape()[2], padded.shape()[3]);

    for i in 0..kh {
        // with cover_all the nominal limit can stick out past the padded
        // extent by up to stride - 1; the window count is unaffected
        let i_lim = (i + sy * out_h).min(p_h);
        for j in 0..kw {
            let j_lim = (j + sx * out_w).min(p_w);
            let window = padded.slice(&[
                DimSpec::Full,
                DimSpec::Full,
                DimSpec::interval(i, sy, i_lim),
                DimSpec::interval(j, sx, j_lim),
            ])?;
            let dst = out.slice(&[
                DimSpec::Full,
                DimSpec::Full,
                DimSpec::Index(i),
                DimSpec::Index(j),
                DimSpec::Full,
                DimSpec::Full,
            ])?;
            copy_into(&dst, &window)?;
        }
    }
    Ok(out)
}

/// Additive adjoint of [`im2col`]: scatters columns back onto an image of
/// spatial extent `(h, w)`, summing the contributions of overlapping
/// kernel positions into a zeroed padded accumulator and cropping the
/// result. The returned tensor is a view of the accumulator; callers must
/// not assume either view or copy semantics.
pub fn col2im<T: TensorDType>(
    col: &Tensor<T>,
    sy: usize,
    sx: usize,
    ph: usize,
    pw: usize,
    h: usize,
    w: usize,
) -> Result<Tensor<T>, OperationError> {
    Enforcer::assert_rank(col.shape(), 6)?;
    Enforcer::check_positive("stride", sy)?;
    Enforcer::check_positive("stride", sx)?;
    Enforcer::check_positive("image height", h)?;
    Enforcer::check_positive("image width", w)?;
    let [n, c, kh, kw, out_h, out_w] = col.shape().try_into()?;
    log::trace!(
        "col2im {:?} s=({sy},{sx}) p=({ph},{pw}) -> img=({h},{w})",
        col.shape()
    );

    let img = Tensor::zeros(
        shape![n, c, h + 2 * ph + sy - 1, w + 2 * pw + sx - 1],
        col.options(),
    );
    let (p_h, p_w) = (img.shape()[2], img.shape()[3]);
    for i in 0..kh {
        let i_lim = (i + sy * out_h).min(p_h);
        for j in 0..kw {
            let j_lim = (j + sx * out_w).min(p_w);
            let window = img.slice(&[
                DimSpec::Full,
                DimSpec::Full,
                DimSpec::interval(i, sy, i_lim),
                DimSpec::interval(j, sx, j_lim),
            ])?;
            let src = col.slice(&[
                DimSpec::Full,
                DimSpec::Full,
                DimSpec::Index(i),
                DimSpec::Index(j),
                DimSpec::Full,
                DimSpec::Full,
            ])?;
            add_into(&window, &src)?;
        }
    }

    let cropped = img.slice(&[
        DimSpec::Full,
        DimSpec::Full,
        DimSpec::interval(ph, 1, ph + h),
        DimSpec::interval(pw, 1, pw + w),
    ])?;
    Ok(cropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Shape, TensorOptions};

    fn arange(shape: Shape) -> Tensor<f32> {
        Tensor::arange_like(shape, TensorOptions::row_major())
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn out_size_cases() {
        assert_eq!(out_size(2, 1, 1, 2, false), Ok(6));
        assert_eq!(out_size(4, 2, 2, 0, false), Ok(2));
        assert_eq!(out_size(5, 2, 2, 0, false), Ok(2));
        assert_eq!(out_size(5, 2, 2, 0, true), Ok(3));
        assert!(out_size(1, 3, 1, 0, false).is_err());
        assert!(out_size(4, 0, 1, 0, false).is_err());
        assert!(out_size(4, 2, 0, 0, false).is_err());
    }

    #[test]
    fn im2col_shape_and_content() {
        init_logs();
        let img = arange(shape![1, 1, 3, 3]);
        let col = im2col(&img, 2, 2, 1, 1, 0, 0, 0.0, false).unwrap();
        assert_eq!(col.shape(), &shape![1, 1, 2, 2, 2, 2]);
        // kernel offset (0, 0) sees the top-left 2x2 windows
        assert_eq!(col.get(&[0, 0, 0, 0, 0, 0]), Ok(0.0));
        assert_eq!(col.get(&[0, 0, 0, 0, 1, 1]), Ok(4.0));
        // kernel offset (1, 1) sees the bottom-right windows
        assert_eq!(col.get(&[0, 0, 1, 1, 0, 0]), Ok(4.0));
        assert_eq!(col.get(&[0, 0, 1, 1, 1, 1]), Ok(8.0));
    }

    #[test]
    fn im2col_padding_uses_pval() {
        let img = arange(shape![1, 1, 2, 2]);
        let col = im2col(&img, 2, 2, 1, 1, 1, 1, -1.0, false).unwrap();
        assert_eq!(col.shape(), &shape![1, 1, 2, 2, 3, 3]);
        // top-left window of kernel offset (0, 0) starts in the padding
        assert_eq!(col.get(&[0, 0, 0, 0, 0, 0]), Ok(-1.0));
        assert_eq!(col.get(&[0, 0, 1, 1, 0, 0]), Ok(0.0));
    }

    #[test]
    fn invalid_inputs() {
        let img = arange(shape![1, 1, 3, 3]);
        assert!(im2col(&img, 0, 2, 1, 1, 0, 0, 0.0, false).is_err());
        assert!(im2col(&img, 2, 2, 0, 1, 0, 0, 0.0, false).is_err());
        let flat = arange(shape![3, 3]);
        assert!(im2col(&flat, 2, 2, 1, 1, 0, 0, 0.0, false).is_err());
        assert!(col2im(&flat, 1, 1, 0, 0, 3, 3).is_err());
    }

    #[test]
    fn unit_kernel_round_trip_is_exact() {
        init_logs();
        // kh=kw=1, sy=sx=1, ph=pw=2: windows never overlap, so the
        // round trip reproduces the image exactly.
        let img = arange(shape![2, 2, 2, 2]);
        let col = im2col(&img, 1, 1, 1, 1, 2, 2, 0.0, false).unwrap();
        assert_eq!(col.shape(), &shape![2, 2, 1, 1, 6, 6]);
        let back = col2im(&col, 1, 1, 2, 2, 2, 2).unwrap();
        assert_eq!(back.shape(), &shape![2, 2, 2, 2]);
        back.all_close(&img, 0.0, 0.0).unwrap();
    }

    #[test]
    fn non_overlapping_round_trip_is_exact() {
        // stride == kernel size: every pixel appears in exactly one window
        let img = arange(shape![1, 2, 4, 4]);
        let col = im2col(&img, 2, 2, 2, 2, 0, 0, 0.0, false).unwrap();
        let back = col2im(&col, 2, 2, 0, 0, 4, 4).unwrap();
        back.all_close(&img, 0.0, 0.0).unwrap();
    }

    #[test]
    fn overlapping_round_trip_scales_by_coverage() {
        // k=2, s=1 on a 3x3 image: the round trip multiplies each pixel
        // by the number of windows covering it.
        let img = arange(shape![1, 1, 3, 3]);
        let ones = Tensor::filled(shape![1, 1, 3, 3], 1.0f32, TensorOptions::row_major());

        let counts = col2im(&im2col(&ones, 2, 2, 1, 1, 0, 0, 0.0, false).unwrap(), 1, 1, 0, 0, 3, 3)
            .unwrap();
        let back = col2im(&im2col(&img, 2, 2, 1, 1, 0, 0, 0.0, false).unwrap(), 1, 1, 0, 0, 3, 3)
            .unwrap();

        // corner pixels are covered once, edges twice, the center 4 times
        assert_eq!(counts.get(&[0, 0, 0, 0]), Ok(1.0));
        assert_eq!(counts.get(&[0, 0, 0, 1]), Ok(2.0));
        assert_eq!(counts.get(&[0, 0, 1, 1]), Ok(4.0));
        for i in 0..3 {
            for j in 0..3 {
                let idx = [0, 0, i, j];
                let expected = img.get(&idx).unwrap() * counts.get(&idx).unwrap();
                assert_eq!(back.get(&idx), Ok(expected));
            }
        }
    }

    #[test]
    fn cover_all_stretches_past_the_boundary() {
        let img = arange(shape![1, 1, 5, 5]);
        let col = im2col(&img, 2, 2, 2, 2, 0, 0, 0.0, true).unwrap();
        assert_eq!(col.shape(), &shape![1, 1, 2, 2, 3, 3]);
        // the stretched window reads the stride-1 high-side padding
        assert_eq!(col.get(&[0, 0, 1, 1, 2, 2]), Ok(0.0));
    }
}
