//! Call signatures for every supported arity.
//!
//! A signal's argument list is a tuple: `()` for a signal that takes no
//! arguments, `(A1,)` for one argument, `(A1, A2)` for two, and so on up to
//! [`MAX_ARITY`]. The traits in this module let plain closures, `fn` items and
//! methods with the matching unpacked parameter list be connected directly,
//! without the caller wrapping them to accept a tuple.

/// Largest number of arguments a signal may carry.
pub const MAX_ARITY: usize = 8;

/// A free function or closure callable with the unpacked `Args` tuple.
///
/// Implemented for every `Fn(A1, .., An) -> R` with `n <= MAX_ARITY`.
pub trait SlotFn<Args, R>: 'static {
    /// Invoke the function with the unpacked arguments.
    fn call(&self, args: Args) -> R;
}

/// A method of `T` callable with the unpacked `Args` tuple.
///
/// Implemented for every `Fn(&T, A1, .., An) -> R` with `n <= MAX_ARITY`,
/// which covers `fn` items such as `Widget::on_click` whose receiver is
/// `&self`. Receivers that need to mutate state use interior mutability.
pub trait MethodFn<T: ?Sized, Args, R>: 'static {
    /// Invoke the method on `object` with the unpacked arguments.
    fn call(&self, object: &T, args: Args) -> R;
}

macro_rules! impl_arity {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> SlotFn<($($arg,)*), R> for F
        where
            F: Fn($($arg),*) -> R + 'static,
        {
            #[allow(non_snake_case, clippy::unused_unit)]
            #[inline]
            fn call(&self, ($($arg,)*): ($($arg,)*)) -> R {
                (self)($($arg),*)
            }
        }

        impl<T: ?Sized, F, R, $($arg,)*> MethodFn<T, ($($arg,)*), R> for F
        where
            F: Fn(&T, $($arg),*) -> R + 'static,
        {
            #[allow(non_snake_case, clippy::unused_unit)]
            #[inline]
            fn call(&self, object: &T, ($($arg,)*): ($($arg,)*)) -> R {
                (self)(object, $($arg),*)
            }
        }
    };
}

impl_arity!();
impl_arity!(A1);
impl_arity!(A1, A2);
impl_arity!(A1, A2, A3);
impl_arity!(A1, A2, A3, A4);
impl_arity!(A1, A2, A3, A4, A5);
impl_arity!(A1, A2, A3, A4, A5, A6);
impl_arity!(A1, A2, A3, A4, A5, A6, A7);
impl_arity!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> i32 {
        42
    }

    #[allow(clippy::too_many_arguments)]
    fn sum8(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8, g: u8, h: u8) -> u32 {
        [a, b, c, d, e, f, g, h].iter().map(|&v| u32::from(v)).sum()
    }

    struct Greeter {
        name: &'static str,
    }

    impl Greeter {
        fn greet(&self, greeting: &'static str, times: usize) -> String {
            format!("{} {}", greeting, self.name).repeat(times)
        }
    }

    #[test]
    fn slot_fn_unpacks_zero_arguments() {
        assert_eq!(SlotFn::<(), i32>::call(&answer, ()), 42);
    }

    #[test]
    fn slot_fn_unpacks_max_arity() {
        let total = SlotFn::call(&sum8, (1, 2, 3, 4, 5, 6, 7, 8));
        assert_eq!(total, 36);
    }

    #[test]
    fn slot_fn_accepts_closures() {
        let offset = 10;
        let add = move |a: i32, b: i32| a + b + offset;
        assert_eq!(SlotFn::call(&add, (1, 2)), 13);
    }

    #[test]
    fn method_fn_passes_receiver_first() {
        let greeter = Greeter { name: "tether" };
        let result = MethodFn::call(&Greeter::greet, &greeter, ("hi", 2));
        assert_eq!(result, "hi tetherhi tether");
    }
}
