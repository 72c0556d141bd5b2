use nalgebra::{Point2, Point3, Point4, Vector3};

/// The meaning of a vertex attribute, and where the default shaders expect to find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeUsage {
    Position,
    Normal,
    Texcoord,
    Color,
}

impl AttributeUsage {
    /// Every usage, in the order attributes are packed into buffers.
    pub const ALL: [AttributeUsage; 4] = [
        AttributeUsage::Position,
        AttributeUsage::Normal,
        AttributeUsage::Texcoord,
        AttributeUsage::Color,
    ];

    /// Shader input location of this attribute.
    #[inline]
    pub const fn location(self) -> u32 {
        match self {
            AttributeUsage::Position => 0,
            AttributeUsage::Normal => 1,
            AttributeUsage::Texcoord => 2,
            AttributeUsage::Color => 3,
        }
    }

    /// Shape of a single value of this attribute.
    #[inline]
    pub const fn attr_type(self) -> AttributeType {
        match self {
            AttributeUsage::Position | AttributeUsage::Normal => AttributeType::Vec3,
            AttributeUsage::Texcoord => AttributeType::Vec2,
            AttributeUsage::Color => AttributeType::Vec4,
        }
    }

    pub fn from_location(location: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.location() == location)
    }
}

/// The inner components of an [AttributeType]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeComponent {
    U16,
    U32,
    F32,
}

impl AttributeComponent {
    pub const fn alignment(self) -> usize {
        use std::mem::align_of;
        match self {
            AttributeComponent::U16 => align_of::<u16>(),
            AttributeComponent::U32 => align_of::<u32>(),
            AttributeComponent::F32 => align_of::<f32>(),
        }
    }

    pub const fn size(self) -> usize {
        use std::mem::size_of;
        match self {
            AttributeComponent::U16 => size_of::<u16>(),
            AttributeComponent::U32 => size_of::<u32>(),
            AttributeComponent::F32 => size_of::<f32>(),
        }
    }
}

/// The shape of a value stored in a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
}

impl AttributeType {
    #[inline]
    pub const fn alignment(self, comp: AttributeComponent) -> usize {
        // arrays have the same alignment as their component type
        comp.alignment()
    }

    pub const fn size_elements(self) -> usize {
        match self {
            AttributeType::Scalar => 1,
            AttributeType::Vec2 => 2,
            AttributeType::Vec3 => 3,
            AttributeType::Vec4 => 4,
        }
    }

    pub const fn size_bytes(self, comp: AttributeComponent) -> usize {
        comp.size() * self.size_elements()
    }
}

/// Full description of how one attribute value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeFormat {
    pub ty: AttributeType,
    pub comp: AttributeComponent,
}

impl AttributeFormat {
    #[inline]
    pub const fn new(ty: AttributeType, comp: AttributeComponent) -> Self {
        Self { ty, comp }
    }

    /// The format of `T`.
    #[inline]
    pub const fn of<T: Attribute>() -> Self {
        Self::new(T::TYPE, T::COMPONENT)
    }

    #[inline]
    pub const fn size_bytes(self) -> usize {
        self.ty.size_bytes(self.comp)
    }
}

/// Trait for types which can be written directly into vertex buffers.
///
/// # Safety
///
/// Implementing types *must* have the size and alignment described by their `TYPE` and
/// `COMPONENT` constants, and must contain no padding; every byte of a value must be
/// initialized so that it can be viewed as `[u8]`.
#[allow(unsafe_code)]
pub unsafe trait Attribute: Copy {
    const TYPE: AttributeType;
    const COMPONENT: AttributeComponent;
}

mod _impl_attr {
    use super::{Attribute, AttributeComponent, AttributeType};

    macro_rules! impl_attr {
        ($t:ident<$C:ty, $c:ident> => $Target:ty) => {
            const _: () = {
                // "size of type $C == size of component $c"
                static_assertions::const_assert_eq!(
                    std::mem::size_of::<$C>(),
                    AttributeComponent::$c.size()
                );
                // "size of type $Target == size of attribute $t with component $c"
                static_assertions::const_assert_eq!(
                    std::mem::size_of::<$Target>(),
                    AttributeType::$t.size_bytes(AttributeComponent::$c)
                );
                // "alignment of type $Target == alignment of attribute $t with component $c"
                static_assertions::const_assert_eq!(
                    std::mem::align_of::<$Target>(),
                    AttributeType::$t.alignment(AttributeComponent::$c)
                );
                #[allow(unsafe_code)]
                unsafe impl Attribute for $Target {
                    const TYPE: AttributeType = AttributeType::$t;
                    const COMPONENT: AttributeComponent = AttributeComponent::$c;
                }
            };
        };
    }

    impl_attr!(Scalar<u16, U16> => u16);
    impl_attr!(Scalar<u32, U32> => u32);
    impl_attr!(Scalar<f32, F32> => f32);

    impl_attr!(Vec2<f32, F32> => nalgebra::Vector2<f32>);
    impl_attr!(Vec2<f32, F32> => nalgebra::Point2<f32>);
    impl_attr!(Vec2<f32, F32> => [f32; 2]);

    impl_attr!(Vec3<f32, F32> => nalgebra::Vector3<f32>);
    impl_attr!(Vec3<f32, F32> => nalgebra::Point3<f32>);
    impl_attr!(Vec3<f32, F32> => [f32; 3]);

    impl_attr!(Vec4<f32, F32> => nalgebra::Vector4<f32>);
    impl_attr!(Vec4<f32, F32> => nalgebra::Point4<f32>);
    impl_attr!(Vec4<f32, F32> => [f32; 4]);
}

/// View a slice of attribute values as raw bytes, in native byte order.
#[inline]
#[allow(unsafe_code)]
pub fn as_bytes<T: Attribute>(values: &[T]) -> &[u8] {
    // safety: `Attribute` guarantees T has no padding & a size matching its description
    unsafe {
        std::slice::from_raw_parts(values.as_ptr() as *const u8, std::mem::size_of_val(values))
    }
}

pub type Position<C = f32> = Point3<C>;
pub type Normal<C = f32> = Vector3<C>;
pub type Texcoord<C = f32> = Point2<C>;
pub type Rgba<C = f32> = Point4<C>;
