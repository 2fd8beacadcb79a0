/// Implement a binary operator from std::ops (and its `*Assign` sibling) for a pair of types,
/// accepting the right-hand side both by value and by reference.
///
/// The left-hand side is always taken by value; every type this is used on is `Copy`.
#[macro_export]
macro_rules! impl_op {
    // $Op for ($Lhs, $Rhs) and ($Lhs, &$Rhs)
    (. $Op:ident, $op:ident -> $Result:ty;
      $lhs:ident: $Lhs:ty, $rhs:ident: $Rhs:ty;
      $act:expr) => {
        impl ::std::ops::$Op<$Rhs> for $Lhs {
            type Output = $Result;
            #[inline]
            fn $op($lhs, $rhs: $Rhs) -> Self::Output {
                $act
            }
        }
        impl ::std::ops::$Op<&$Rhs> for $Lhs {
            type Output = $Result;
            #[inline]
            fn $op($lhs, $rhs: &$Rhs) -> Self::Output {
                $act
            }
        }
    };
    // $OpAssign for $Lhs over [$Rhs, &$Rhs]
    (= $Assign:ident, $assign:ident;
      $lhs:ident: $Lhs:ty, $rhs:ident: $Rhs:ty;
      $act:expr) => {
        impl ::std::ops::$Assign<$Rhs> for $Lhs {
            #[inline]
            fn $assign(&mut $lhs, $rhs: $Rhs) {
                $act
            }
        }
        impl ::std::ops::$Assign<&$Rhs> for $Lhs {
            #[inline]
            fn $assign(&mut $lhs, $rhs: &$Rhs) {
                $act
            }
        }
    };
    ($Op:ident, $op:ident, $Assign:ident, $assign:ident;
      $lhs:ident: $Lhs:ty, $rhs:ident: $Rhs:ty;
      $op_act:expr;
      $assign_act:expr
    ) => {
        $crate::impl_op!(. $Op, $op -> $Lhs; $lhs: $Lhs, $rhs: $Rhs; $op_act);
        $crate::impl_op!(= $Assign, $assign; $lhs: $Lhs, $rhs: $Rhs; $assign_act);
    };
}
