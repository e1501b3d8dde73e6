pub(crate) mod combine;
pub(crate) mod keyed;

pub use keyed::reduce_partition_for;
