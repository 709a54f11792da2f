//! Argument matching shared by constructors, factory methods and field
//! autowiring.
//!
//! Targets (parameters or fields) are visited subclass-first: a target is
//! placed after every other target whose type it is assignable from, so a
//! broad `dyn Trait` parameter cannot swallow the instance a narrower
//! parameter needs. Each target then takes the first remaining candidate
//! assignable to it, and that candidate leaves the pool.

use crate::error::{Error, Result};
use crate::types::{AnyBox, BeanInstance, Injectable, TypeRef};

use std::sync::Arc;
use tracing::trace;

/// Resolved arguments for one constructor or factory-method call, indexed
/// by parameter position.
pub struct Arguments {
  values: Vec<Option<AnyBox>>,
}

impl Arguments {
  pub(crate) fn empty() -> Self {
    Self { values: Vec::new() }
  }

  /// Takes the argument at `index` as `Arc<P>`.
  pub fn take<P: ?Sized + 'static>(&mut self, index: usize) -> Result<Arc<P>> {
    self
      .values
      .get_mut(index)
      .and_then(Option::take)
      .and_then(|value| value.downcast::<Arc<P>>().ok())
      .map(|arc| *arc)
      .ok_or_else(|| Error::ArgumentMismatch {
        index,
        type_name: std::any::type_name::<P>().to_string(),
      })
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// A callable that builds a `T` from injected `Arc` arguments.
///
/// Implemented for closures and functions taking up to eight `Arc<P>`
/// arguments, where every `P` is [`Injectable`]. `Args` is a marker that keeps
/// the arities apart.
pub trait Constructor<Args, T>: Send + Sync + 'static {
  fn parameters(&self) -> Vec<TypeRef>;
  fn construct(&self, arguments: &mut Arguments) -> Result<T>;
}

/// A method on a factory object of type `C` that builds a `T` from injected
/// `Arc` arguments. The factory-object counterpart of [`Constructor`].
pub trait FactoryMethod<C, Args, T>: Send + Sync + 'static {
  fn parameters(&self) -> Vec<TypeRef>;
  fn invoke(&self, factory: &C, arguments: &mut Arguments) -> Result<T>;
}

macro_rules! impl_callables {
  ($($param:ident => $index:tt),*) => {
    impl<F, T, $($param,)*> Constructor<fn($(Arc<$param>),*), T> for F
    where
      F: Fn($(Arc<$param>),*) -> T + Send + Sync + 'static,
      $($param: ?Sized + Injectable,)*
    {
      fn parameters(&self) -> Vec<TypeRef> {
        vec![$($param::type_ref()),*]
      }

      #[allow(unused_variables)]
      fn construct(&self, arguments: &mut Arguments) -> Result<T> {
        Ok((self)($(arguments.take::<$param>($index)?),*))
      }
    }

    impl<F, C, T, $($param,)*> FactoryMethod<C, fn($(Arc<$param>),*), T> for F
    where
      F: Fn(&C, $(Arc<$param>),*) -> T + Send + Sync + 'static,
      $($param: ?Sized + Injectable,)*
    {
      fn parameters(&self) -> Vec<TypeRef> {
        vec![$($param::type_ref()),*]
      }

      #[allow(unused_variables)]
      fn invoke(&self, factory: &C, arguments: &mut Arguments) -> Result<T> {
        Ok((self)(factory, $(arguments.take::<$param>($index)?),*))
      }
    }
  };
}

impl_callables!();
impl_callables!(P0 => 0);
impl_callables!(P0 => 0, P1 => 1);
impl_callables!(P0 => 0, P1 => 1, P2 => 2);
impl_callables!(P0 => 0, P1 => 1, P2 => 2, P3 => 3);
impl_callables!(P0 => 0, P1 => 1, P2 => 2, P3 => 3, P4 => 4);
impl_callables!(P0 => 0, P1 => 1, P2 => 2, P3 => 3, P4 => 4, P5 => 5);
impl_callables!(P0 => 0, P1 => 1, P2 => 2, P3 => 3, P4 => 4, P5 => 5, P6 => 6);
impl_callables!(P0 => 0, P1 => 1, P2 => 2, P3 => 3, P4 => 4, P5 => 5, P6 => 6, P7 => 7);

/// Returns the indices of `targets` in subclass-first order.
///
/// Repeatedly picks the first remaining target that is not a strict supertype
/// of another remaining target. Equal and unrelated types keep declaration
/// order.
pub(crate) fn subclasses_first(targets: &[TypeRef]) -> Vec<usize> {
  let mut remaining: Vec<usize> = (0..targets.len()).collect();
  let mut order = Vec::with_capacity(targets.len());

  while !remaining.is_empty() {
    let next = remaining
      .iter()
      .position(|&candidate| {
        !remaining.iter().any(|&other| {
          other != candidate
            && targets[candidate] != targets[other]
            && targets[candidate].is_assignable_from(&targets[other])
        })
      })
      .unwrap_or(0);
    order.push(remaining.remove(next));
  }
  order
}

/// Removes and returns the first pool entry assignable to `target`.
pub(crate) fn take_match(pool: &mut Vec<BeanInstance>, target: &TypeRef) -> Option<BeanInstance> {
  let position = pool
    .iter()
    .position(|candidate| target.is_assignable_from(candidate.ty()))?;
  Some(pool.remove(position))
}

/// Matches every parameter against the pool and returns the call arguments.
pub(crate) fn resolve_arguments(
  bean: &str,
  parameters: &[TypeRef],
  pool: &mut Vec<BeanInstance>,
) -> Result<Arguments> {
  let mut values: Vec<Option<AnyBox>> = parameters.iter().map(|_| None).collect();

  for index in subclasses_first(parameters) {
    let parameter = &parameters[index];
    let candidate = take_match(pool, parameter).ok_or_else(|| Error::NoMatchingDependency {
      bean: bean.to_string(),
      parameter: parameter.name().to_string(),
    })?;
    trace!(
      bean,
      parameter = parameter.name(),
      candidate = candidate.ty().name(),
      "Matched parameter #{}",
      index
    );
    values[index] = Some(candidate.view(parameter).ok_or_else(|| Error::ArgumentMismatch {
      index,
      type_name: parameter.name().to_string(),
    })?);
  }

  Ok(Arguments { values })
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Base: Send + Sync {}
  struct Derived;
  struct Plain;
  impl Base for Derived {}
  impl Base for Plain {}

  fn base() -> TypeRef {
    TypeRef::of::<dyn Base>()
  }

  fn derived() -> TypeRef {
    TypeRef::component::<Derived>()
      .implements::<dyn Base>(|bean| bean)
      .build()
  }

  fn plain() -> TypeRef {
    TypeRef::component::<Plain>()
      .implements::<dyn Base>(|bean| bean)
      .build()
  }

  #[test]
  fn test_supertype_goes_after_its_subtypes() {
    let order = subclasses_first(&[base(), derived()]);
    assert_eq!(order, vec![1, 0]);
  }

  #[test]
  fn test_unrelated_and_equal_types_keep_declaration_order() {
    let order = subclasses_first(&[plain(), derived(), plain()]);
    assert_eq!(order, vec![0, 1, 2]);
  }

  #[test]
  fn test_supertype_behind_several_subtypes() {
    let order = subclasses_first(&[base(), plain(), base(), derived()]);
    assert_eq!(order, vec![1, 3, 0, 2]);
  }

  #[test]
  fn test_take_match_consumes_first_assignable_candidate() {
    let mut pool = vec![
      BeanInstance::new(Plain, plain()),
      BeanInstance::new(Derived, derived()),
    ];

    let taken = take_match(&mut pool, &derived()).unwrap();
    assert_eq!(taken.ty(), &derived());
    assert_eq!(pool.len(), 1);

    let taken = take_match(&mut pool, &base()).unwrap();
    assert_eq!(taken.ty(), &plain());
    assert!(pool.is_empty());

    assert!(take_match(&mut pool, &base()).is_none());
  }

  #[test]
  fn test_resolve_arguments_reports_unmatched_parameter() {
    let mut pool = vec![BeanInstance::new(Plain, plain())];
    let result = resolve_arguments("holder", &[derived()], &mut pool);

    match result {
      Err(Error::NoMatchingDependency { bean, parameter }) => {
        assert_eq!(bean, "holder");
        assert!(parameter.ends_with("Derived"));
      }
      other => panic!("unexpected result: {:?}", other.map(|args| args.len())),
    }
  }
}
