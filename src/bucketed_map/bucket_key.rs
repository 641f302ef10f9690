/// Keys that a [`BucketedMap`](crate::BucketedMap) can route to a bucket.
///
/// The routing is a plain `key mod buckets`, which only spreads keys usefully
/// when they are integers; the trait is implemented for every primitive
/// integer type and nothing else. Signed keys use the Euclidean remainder, so
/// `-1` lands in the last bucket rather than producing a negative index.
///
/// Implementations must return a value in `0..buckets` and must agree for
/// keys that compare equal.
///
/// # Examples
///
/// ```
/// use bst_maps::BucketKey;
///
/// assert_eq!(7u32.bucket(3), 1);
/// assert_eq!((-1i64).bucket(50), 49);
/// ```
pub trait BucketKey {
    /// Returns the bucket index for this key among `buckets` buckets.
    ///
    /// `buckets` is never zero.
    fn bucket(&self, buckets: usize) -> usize;
}

macro_rules! unsigned_bucket_key {
    ($($t:ty),*) => {$(
        impl BucketKey for $t {
            #[inline]
            #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
            fn bucket(&self, buckets: usize) -> usize {
                (*self as u128 % buckets as u128) as usize
            }
        }
    )*};
}

macro_rules! signed_bucket_key {
    ($($t:ty),*) => {$(
        impl BucketKey for $t {
            #[inline]
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_possible_wrap,
                clippy::cast_sign_loss,
                clippy::cast_lossless
            )]
            fn bucket(&self, buckets: usize) -> usize {
                (*self as i128).rem_euclid(buckets as i128) as usize
            }
        }
    )*};
}

unsigned_bucket_key!(u8, u16, u32, u64, u128, usize);
signed_bucket_key!(i8, i16, i32, i64, i128, isize);
