//! Precondition checks run before any kernel is enqueued.

use crate::buffer::{AccBuffer, Dims};
use crate::error::{Error, Result};

pub(crate) fn non_empty(operation: &'static str, len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::EmptyInput { operation });
    }
    Ok(())
}

pub(crate) fn at_least(operation: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        return Err(Error::BufferTooSmall {
            operation,
            required,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn same_len(operation: &'static str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(Error::LengthMismatch {
            operation,
            left,
            right,
        });
    }
    Ok(())
}

/// Image shape of `buffer`, rejecting plain arrays.
pub(crate) fn image_dims<T>(operation: &'static str, buffer: &AccBuffer<T>) -> Result<Dims>
where
    T: Copy + Default + Send + Sync + 'static,
{
    buffer.dims().ok_or(Error::MissingDimensions { operation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stream::Stream;

    #[test]
    fn test_checks() {
        assert!(non_empty("min", 1).is_ok());
        assert!(matches!(non_empty("min", 0), Err(Error::EmptyInput { operation: "min" })));
        assert!(at_least("sort", 4, 4).is_ok());
        assert_eq!(at_least("sort", 5, 4).unwrap_err().kind(), ErrorKind::Contract);
        assert!(same_len("eulers", 3, 3).is_ok());
        assert!(same_len("eulers", 3, 2).is_err());
    }

    #[test]
    fn test_image_dims_requires_shape() {
        let stream = Stream::new().unwrap();
        let flat = AccBuffer::<f32>::new(9, &stream);
        assert!(matches!(
            image_dims("translate", &flat),
            Err(Error::MissingDimensions { .. })
        ));
        let img = AccBuffer::<f32>::image(Dims::new_2d(3, 3), &stream).unwrap();
        assert_eq!(image_dims("translate", &img).unwrap(), Dims::new_2d(3, 3));
    }
}
